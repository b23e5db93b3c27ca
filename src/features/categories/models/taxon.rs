use sqlx::FromRow;

/// Database model shared by categories and genres
#[derive(Debug, Clone, FromRow)]
pub struct Taxon {
    pub name: String,
    pub slug: String,
}

/// Table and display name of one taxonomy
pub trait TaxonomyKind: Send + Sync + 'static {
    const TABLE: &'static str;
    const NAME: &'static str;
}

pub struct CategoryKind;

impl TaxonomyKind for CategoryKind {
    const TABLE: &'static str = "categories";
    const NAME: &'static str = "Category";
}

pub struct GenreKind;

impl TaxonomyKind for GenreKind {
    const TABLE: &'static str = "genres";
    const NAME: &'static str = "Genre";
}
