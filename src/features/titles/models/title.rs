use sqlx::FromRow;

/// Title joined with its category and aggregated rating
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: i64,
    pub name: String,
    pub year: i16,
    pub description: Option<String>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    /// Mean review score, `None` without reviews
    pub rating: Option<f64>,
}

/// One genre attached to a title
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenre {
    pub title_id: i64,
    pub name: String,
    pub slug: String,
}
