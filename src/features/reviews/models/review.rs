use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Review joined with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

/// Comment joined with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}
