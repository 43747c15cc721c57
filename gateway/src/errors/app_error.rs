use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::core::{BackendError, SynthesisError};

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request body could not be understood
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Machine-readable label for the JSON body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Synthesis(e) => e.kind(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Synthesis(SynthesisError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Synthesis(SynthesisError::Conversion(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Synthesis(SynthesisError::Backend(e)) => match e {
                BackendError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                BackendError::Status { status, .. } if *status >= 500 => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}
