use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, synthesize};
use crate::state::AppState;
use std::sync::Arc;

/// Create the protected synthesis router
///
/// Note: the shared-secret middleware is applied by [`super::create_app`]
/// once state is available.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/synthesize", post(synthesize::synthesize_handler))
        .layer(TraceLayer::new_for_http())
}

/// Create the unauthenticated routes
///
/// `/test` is only mounted when `enable_test_endpoint` is set.
pub fn create_public_router(enable_test_endpoint: bool) -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/", get(api::root_info))
        .route("/health", get(api::health_check));

    let router = if enable_test_endpoint {
        router.route("/test", post(synthesize::test_handler))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}
