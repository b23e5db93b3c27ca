use std::sync::Arc;

use axum::Router;

use crate::core::resource::resource_routes;
use crate::features::titles::services::TitleService;

/// Title routes: public reads, admin writes
pub fn routes(service: Arc<TitleService>) -> Router {
    resource_routes("/titles", "/titles/{title_id}", service)
}
