use crate::core::resource::method_not_allowed;
use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route(
            "/auth/signup",
            post(handlers::signup).fallback(method_not_allowed),
        )
        .route(
            "/auth/token",
            post(handlers::token).fallback(method_not_allowed),
        )
        .with_state(service)
}
