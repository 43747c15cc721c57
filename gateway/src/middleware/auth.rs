use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::errors::auth_error::AuthError;
use crate::state::AppState;

/// Header carrying the shared secret
pub const VAPI_SECRET_HEADER: &str = "x-vapi-secret";

/// Compare the presented secret with the configured one in constant time.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Check the `X-VAPI-SECRET` header against the configured secret.
///
/// An unset server secret rejects every request.
pub fn check_secret(presented: Option<&str>, expected: Option<&str>) -> Result<(), AuthError> {
    let expected = expected.ok_or(AuthError::NotConfigured)?;
    let presented = presented.ok_or(AuthError::MissingSecret)?;

    if secrets_match(presented, expected) {
        Ok(())
    } else {
        Err(AuthError::InvalidSecret)
    }
}

/// Shared-secret authentication middleware for the synthesis route
pub async fn vapi_secret_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let presented = request
        .headers()
        .get(VAPI_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    match check_secret(presented, state.config.vapi_secret.as_deref()) {
        Ok(()) => {
            tracing::debug!(path = %request.uri().path(), "VAPI secret accepted");
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = e.kind(),
                "VAPI secret authentication failed"
            );
            Err(e)
        }
    }
}
