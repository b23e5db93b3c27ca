use std::sync::Arc;

use axum::Router;

use crate::core::resource::resource_routes;
use crate::features::reviews::services::{CommentService, ReviewService};

/// Reviews and comments nested under titles: public reads, authenticated
/// writes, edits by the author or staff
pub fn routes(reviews: Arc<ReviewService>, comments: Arc<CommentService>) -> Router {
    Router::new()
        .merge(resource_routes(
            "/titles/{title_id}/reviews",
            "/titles/{title_id}/reviews/{review_id}",
            reviews,
        ))
        .merge(resource_routes(
            "/titles/{title_id}/reviews/{review_id}/comments",
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            comments,
        ))
}
