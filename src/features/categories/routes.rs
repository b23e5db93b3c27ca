use std::sync::Arc;

use axum::Router;

use crate::core::resource::resource_routes;
use crate::features::categories::services::{CategoryService, GenreService};

/// Category and genre routes: public reads, admin writes
pub fn routes(categories: Arc<CategoryService>, genres: Arc<GenreService>) -> Router {
    Router::new()
        .merge(resource_routes(
            "/categories",
            "/categories/{slug}",
            categories,
        ))
        .merge(resource_routes("/genres", "/genres/{slug}", genres))
}
