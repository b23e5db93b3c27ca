use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::core::permissions::ReadOnlyOrAuthorOrStaff;
use crate::core::resource::{NoFilter, Operations, Resource};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reviews::dtos::{CreateReviewDto, ReviewResponseDto, UpdateReviewDto};
use crate::features::reviews::models::ReviewRow;
use crate::shared::types::PaginationQuery;

const REVIEW_SELECT: &str = r#"
    SELECT r.id, u.username AS author, r.text, r.score, r.pub_date
    FROM reviews r
    JOIN users u ON u.id = r.author_id
"#;

const ALREADY_REVIEWED: &str = "You have already reviewed this title";

/// Collection path of `/titles/{title_id}/reviews`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TitleScope {
    pub title_id: i64,
}

/// Item path of `/titles/{title_id}/reviews/{review_id}`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReviewKey {
    pub title_id: i64,
    pub review_id: i64,
}

/// Service for reviews; one review per author per title
pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_title(&self, title_id: i64) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)")
            .bind(title_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check title {}: {:?}", title_id, e);
                AppError::Database(e)
            })?;

        if !exists {
            return Err(AppError::NotFound(format!("Title {} not found", title_id)));
        }
        Ok(())
    }

    async fn get(&self, key: &ReviewKey) -> Result<ReviewRow> {
        sqlx::query_as::<_, ReviewRow>(&format!(
            "{} WHERE r.id = $1 AND r.title_id = $2",
            REVIEW_SELECT
        ))
        .bind(key.review_id)
        .bind(key.title_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get review {}: {:?}", key.review_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| not_found(key))
    }
}

fn not_found(key: &ReviewKey) -> AppError {
    AppError::NotFound(format!(
        "Review {} not found for title {}",
        key.review_id, key.title_id
    ))
}

#[async_trait]
impl Resource for ReviewService {
    type Scope = TitleScope;
    type Key = ReviewKey;
    type Filter = NoFilter;
    type Create = CreateReviewDto;
    type Update = UpdateReviewDto;
    type Output = ReviewResponseDto;
    type Permission = ReadOnlyOrAuthorOrStaff;

    const NAME: &'static str = "Review";
    const OPERATIONS: Operations = Operations::ALL;

    async fn list(
        &self,
        scope: &TitleScope,
        _filter: &NoFilter,
        page: &PaginationQuery,
    ) -> Result<(Vec<ReviewResponseDto>, i64)> {
        self.ensure_title(scope.title_id).await?;

        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "{} WHERE r.title_id = $1 ORDER BY r.pub_date DESC, r.id DESC LIMIT $2 OFFSET $3",
            REVIEW_SELECT
        ))
        .bind(scope.title_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reviews: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(scope.title_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reviews: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn retrieve(&self, key: &ReviewKey) -> Result<ReviewResponseDto> {
        Ok(self.get(key).await?.into())
    }

    async fn create(
        &self,
        actor: &AuthenticatedUser,
        scope: &TitleScope,
        input: CreateReviewDto,
    ) -> Result<ReviewResponseDto> {
        self.ensure_title(scope.title_id).await?;

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE title_id = $1 AND author_id = $2)",
        )
        .bind(scope.title_id)
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check existing review: {:?}", e);
            AppError::Database(e)
        })?;

        if duplicate {
            return Err(AppError::Conflict(ALREADY_REVIEWED.to_string()));
        }

        // Concurrent inserts that pass the check hit unique_title_author.
        let review_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO reviews (title_id, author_id, text, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(scope.title_id)
        .bind(actor.id)
        .bind(&input.text)
        .bind(input.score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, ALREADY_REVIEWED))?;

        tracing::info!(
            "Review created: id={}, title_id={}, author={}",
            review_id,
            scope.title_id,
            actor.username
        );

        self.retrieve(&ReviewKey {
            title_id: scope.title_id,
            review_id,
        })
        .await
    }

    async fn update(&self, key: &ReviewKey, input: UpdateReviewDto) -> Result<ReviewResponseDto> {
        let result = sqlx::query(
            r#"
            UPDATE reviews SET
                text = COALESCE($3, text),
                score = COALESCE($4, score)
            WHERE id = $1 AND title_id = $2
            "#,
        )
        .bind(key.review_id)
        .bind(key.title_id)
        .bind(input.text.as_deref())
        .bind(input.score)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, ALREADY_REVIEWED))?;

        if result.rows_affected() == 0 {
            return Err(not_found(key));
        }

        tracing::info!("Review updated: id={}", key.review_id);
        self.retrieve(key).await
    }

    async fn destroy(&self, key: &ReviewKey) -> Result<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND title_id = $2")
            .bind(key.review_id)
            .bind(key.title_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete review: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(not_found(key));
        }

        tracing::info!("Review deleted: id={}", key.review_id);
        Ok(())
    }

    async fn owner(&self, key: &ReviewKey) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT author_id FROM reviews WHERE id = $1 AND title_id = $2")
            .bind(key.review_id)
            .bind(key.title_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load review author: {:?}", e);
                AppError::Database(e)
            })?
            .map(Some)
            .ok_or_else(|| not_found(key))
    }
}
