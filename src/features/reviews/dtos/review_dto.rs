use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::reviews::models::{CommentRow, ReviewRow};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponseDto {
    pub id: i64,
    pub text: String,
    /// Author username
    pub author: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

impl From<ReviewRow> for ReviewResponseDto {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: r.id,
            text: r.text,
            author: r.author,
            score: r.score,
            pub_date: r.pub_date,
        }
    }
}

/// Request DTO for reviewing a title; the author is the caller
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReviewDto {
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,

    #[validate(range(min = 1, max = 10, message = "Score must be between 1 and 10"))]
    pub score: i16,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReviewDto {
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: Option<String>,

    #[validate(range(min = 1, max = 10, message = "Score must be between 1 and 10"))]
    pub score: Option<i16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: i64,
    pub text: String,
    /// Author username
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl From<CommentRow> for CommentResponseDto {
    fn from(c: CommentRow) -> Self {
        Self {
            id: c.id,
            text: c.text,
            author: c.author,
            pub_date: c.pub_date,
        }
    }
}

/// Request DTO for creating or editing a comment
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CommentTextDto {
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_score_bounds() {
        for (score, ok) in [(0, false), (1, true), (10, true), (11, false), (-3, false)] {
            let dto = CreateReviewDto {
                text: "Great".to_string(),
                score,
            };
            assert_eq!(dto.validate().is_ok(), ok, "score {}", score);
        }
    }

    #[test]
    fn test_partial_review_update() {
        let dto: UpdateReviewDto = serde_json::from_value(json!({ "score": 4 })).unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.text.is_none());

        let dto: UpdateReviewDto = serde_json::from_value(json!({ "score": 40 })).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_review_response_shape() {
        let dto = ReviewResponseDto::from(ReviewRow {
            id: 3,
            author: "alice".to_string(),
            text: "Great".to_string(),
            score: 8,
            pub_date: Utc::now(),
        });
        let value = serde_json::to_value(dto).unwrap();
        assert_eq!(value["author"], "alice");
        assert!(value.get("author_id").is_none());
        assert!(value.get("title_id").is_none());
    }
}
