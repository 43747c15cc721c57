use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Shared-secret authentication failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing X-VAPI-SECRET header")]
    MissingSecret,

    #[error("Invalid X-VAPI-SECRET header")]
    InvalidSecret,

    /// No secret is configured, so no caller can authenticate
    #[error("Server has no VAPI secret configured")]
    NotConfigured,
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingSecret => "missing_secret",
            Self::InvalidSecret => "invalid_secret",
            Self::NotConfigured => "secret_not_configured",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
