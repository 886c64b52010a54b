// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User directory handlers.

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::ApiResult;
use crate::state::AppState;

// =============================================================================
// List
// =============================================================================

/// GET /api/users (ADMIN)
///
/// Lists every account as a public summary. Password hashes and refresh
/// tokens never leave the store.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.users().list().await?;

    Ok(Json(users))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenConfig;
    use crate::config::ApiConfig;
    use crate::password;
    use crate::store::UserRecord;
    use steward_core::Role;

    fn test_state() -> AppState {
        let config = ApiConfig::default().with_tokens(TokenConfig::new(
            "access-secret-that-is-long-enough-for-tests",
            "refresh-secret-that-is-long-enough-for-tests",
        ));
        AppState::builder().config(config).build().unwrap()
    }

    #[tokio::test]
    async fn test_listing_excludes_credentials() {
        let state = test_state();
        let hash = password::hash_password("pw").unwrap();
        let mut record = UserRecord::new("Ana", "ana@example.com", hash, Role::Developer);
        record.refresh_token = Some("opaque-session".to_string());
        state.users().insert(record).await.unwrap();

        let response = list_users(State(state)).await.unwrap().into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["email"], "ana@example.com");
        assert_eq!(users[0]["role"], "DEVELOPER");
        assert!(users[0].get("passwordHash").is_none());
        assert!(users[0].get("refreshToken").is_none());
    }

    #[tokio::test]
    async fn test_listing_orders_by_creation() {
        let state = test_state();
        for email in ["first@example.com", "second@example.com", "third@example.com"] {
            let hash = password::hash_password("pw").unwrap();
            state
                .users()
                .insert(UserRecord::new("User", email, hash, Role::Developer))
                .await
                .unwrap();
        }

        let response = list_users(State(state)).await.unwrap().into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let emails: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|user| user["email"].as_str().unwrap())
            .collect();
        assert_eq!(
            emails,
            vec!["first@example.com", "second@example.com", "third@example.com"]
        );
    }
}
