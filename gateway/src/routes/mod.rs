//! Route configuration

pub mod api;

use axum::{Router, middleware};
use std::sync::Arc;

use crate::middleware::vapi_secret_middleware;
use crate::state::AppState;

/// Assemble every route with its middleware and bind the shared state.
///
/// Server-wide layers (CORS, security headers) are added by the binary.
pub fn create_app(state: Arc<AppState>) -> Router {
    let protected_routes = api::create_api_router().layer(middleware::from_fn_with_state(
        state.clone(),
        vapi_secret_middleware,
    ));

    let public_routes = api::create_public_router(state.config.enable_test_endpoint);

    public_routes.merge(protected_routes).with_state(state)
}
