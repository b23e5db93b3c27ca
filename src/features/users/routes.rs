use crate::core::resource::{method_not_allowed, resource_routes};
use crate::features::users::handlers::profile_handler;
use crate::features::users::services::UserService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/users/me",
            get(profile_handler::get_profile)
                .patch(profile_handler::update_profile)
                .fallback(method_not_allowed),
        )
        .with_state(service.clone())
        .merge(resource_routes("/users", "/users/{username}", service))
}
