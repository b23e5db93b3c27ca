mod taxon;

pub use taxon::{CategoryKind, GenreKind, Taxon, TaxonomyKind};
