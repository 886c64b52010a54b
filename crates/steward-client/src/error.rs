// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client error types.

use reqwest::StatusCode;
use steward_core::ErrorBody;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// ClientError
// =============================================================================

/// Errors surfaced by the client SDK.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: connect, TLS, timeout, malformed response.
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a structured error body.
    #[error("server rejected request ({status}): {code}: {message}")]
    Api {
        /// HTTP status of the rejection.
        status: StatusCode,
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// Reading or writing the durable session file failed.
    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serializing the session file failed.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No refresh token is available, or the session was ended by a
    /// concurrent refresh failure.
    #[error("no active session")]
    NoSession,
}

impl ClientError {
    /// Builds an `Api` error from a structured error body, falling back to
    /// the raw text when the body does not parse.
    pub fn from_response_body(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => ClientError::Api {
                status,
                code: parsed.error.code,
                message: parsed.error.message,
            },
            Err(_) => ClientError::Api {
                status,
                code: "UNKNOWN".to_string(),
                message: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }

    /// Returns the HTTP status for server rejections.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status(),
            _ => None,
        }
    }

    /// Returns `true` for a 401 rejection, the trigger for a silent refresh.
    pub fn is_unauthenticated(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_body_parses() {
        let body = br#"{"error":{"code":"INVALID_TOKEN","message":"Invalid refresh token"}}"#;
        let err = ClientError::from_response_body(StatusCode::FORBIDDEN, body);
        match err {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(code, "INVALID_TOKEN");
                assert_eq!(message, "Invalid refresh token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unstructured_body_falls_back() {
        let err = ClientError::from_response_body(StatusCode::BAD_GATEWAY, b"upstream sad");
        match &err {
            ClientError::Api { code, message, .. } => {
                assert_eq!(code, "UNKNOWN");
                assert_eq!(message, "upstream sad");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert!(!err.is_unauthenticated());
    }

    #[test]
    fn test_unauthenticated_detection() {
        let err = ClientError::from_response_body(
            StatusCode::UNAUTHORIZED,
            br#"{"error":{"code":"UNAUTHENTICATED","message":"No authorization token provided"}}"#,
        );
        assert!(err.is_unauthenticated());
    }
}
