//! Error types for the graphdemo client.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use reqwest::StatusCode;
use thiserror::Error;

/// Error returned by the auth, token and Graph components.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}")]
    Provider { status: StatusCode },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to read input: {0}")]
    Input(String),

    #[error("Authorization was denied: {0}")]
    AuthorizationDenied(String),

    #[error("State validation failed (possible CSRF attack)")]
    StateMismatch,
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl ApiError {
    /// Returns a user-friendly message for display on the terminal.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(_) => "Network error. Check your connection.",
            Self::Provider { status } if *status == StatusCode::UNAUTHORIZED => {
                "Access token was rejected. Sign in again."
            }
            Self::Provider { status } if *status == StatusCode::FORBIDDEN => {
                "Insufficient permissions. Check the requested scopes."
            }
            Self::Provider { status } if *status == StatusCode::BAD_REQUEST => {
                "Request was rejected. The authorization code may be expired or already used."
            }
            Self::Provider { .. } => "Unexpected response from Microsoft. Please try again.",
            Self::Decode(_) => "Unexpected response format from Microsoft.",
            Self::Input(_) => "No input was read from the terminal.",
            Self::AuthorizationDenied(_) => "Sign-in was denied or cancelled.",
            Self::StateMismatch => "Security error. Please try signing in again.",
        }
    }

    /// Returns the HTTP status when this error came from a non-200 response.
    #[cfg(test)]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Provider { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = ApiError::Provider {
            status: StatusCode::UNAUTHORIZED,
        };
        assert_eq!(err.user_message(), "Access token was rejected. Sign in again.");

        let err = ApiError::Provider {
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(
            err.user_message(),
            "Unexpected response from Microsoft. Please try again."
        );

        let err = ApiError::StateMismatch;
        assert_eq!(err.user_message(), "Security error. Please try signing in again.");
    }

    #[test]
    fn test_provider_display_carries_status_text() {
        let err = ApiError::Provider {
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(err.to_string(), "Provider returned HTTP 404 Not Found");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(ApiError::Input("eof".into()).status(), None);
    }

    #[test]
    fn test_decode_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ApiError::from(parse_err);
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
