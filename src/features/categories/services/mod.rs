mod taxonomy_service;

pub use taxonomy_service::{CategoryService, GenreService};

#[cfg(test)]
pub use taxonomy_service::SlugKey;
