// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use serde::{Deserialize, Serialize};
use steward_core::Role;
use uuid::Uuid;

use super::AccessClaims;

/// Authentication context for a verified request.
///
/// Attached to request extensions by the session verifier; everything
/// downstream (role gate, handlers) reads identity and role from here
/// instead of re-decoding the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// User id (token subject).
    pub user_id: Uuid,
    /// User's email.
    pub email: String,
    /// Role carried by the verified access token.
    pub role: Role,
}

impl AuthContext {
    /// Creates a context from verified access claims.
    pub fn from_claims(claims: &AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            role: claims.role,
        }
    }

    /// Returns `true` if the context holds the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Returns `true` if the context holds any of the given roles.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Returns `true` for administrators.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_claims() {
        let claims = AccessClaims::new(Uuid::now_v7(), "lena@example.com", Role::Lead, 900);
        let ctx = AuthContext::from_claims(&claims);

        assert_eq!(ctx.user_id, claims.sub);
        assert_eq!(ctx.email, "lena@example.com");
        assert!(ctx.has_role(Role::Lead));
        assert!(ctx.has_any_role(&[Role::Admin, Role::Lead]));
        assert!(!ctx.has_any_role(&[Role::Admin, Role::Developer]));
        assert!(!ctx.is_admin());
    }
}
