use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::core::permissions::ReadOnlyOrAuthorOrStaff;
use crate::core::resource::{NoFilter, Operations, Resource};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reviews::dtos::{CommentResponseDto, CommentTextDto};
use crate::features::reviews::models::CommentRow;
use crate::shared::types::PaginationQuery;

/// Comments are reachable only through a review of the title in the path.
const COMMENT_SELECT: &str = r#"
    SELECT c.id, u.username AS author, c.text, c.pub_date
    FROM comments c
    JOIN reviews r ON r.id = c.review_id
    JOIN users u ON u.id = c.author_id
"#;

/// Collection path of `/titles/{title_id}/reviews/{review_id}/comments`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReviewScope {
    pub title_id: i64,
    pub review_id: i64,
}

/// Item path of `/titles/{title_id}/reviews/{review_id}/comments/{comment_id}`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CommentKey {
    pub title_id: i64,
    pub review_id: i64,
    pub comment_id: i64,
}

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_review(&self, scope: &ReviewScope) -> Result<()> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE id = $1 AND title_id = $2)",
        )
        .bind(scope.review_id)
        .bind(scope.title_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check review {}: {:?}", scope.review_id, e);
            AppError::Database(e)
        })?;

        if !exists {
            return Err(AppError::NotFound(format!(
                "Review {} not found for title {}",
                scope.review_id, scope.title_id
            )));
        }
        Ok(())
    }
}

fn not_found(key: &CommentKey) -> AppError {
    AppError::NotFound(format!(
        "Comment {} not found for review {}",
        key.comment_id, key.review_id
    ))
}

#[async_trait]
impl Resource for CommentService {
    type Scope = ReviewScope;
    type Key = CommentKey;
    type Filter = NoFilter;
    type Create = CommentTextDto;
    type Update = CommentTextDto;
    type Output = CommentResponseDto;
    type Permission = ReadOnlyOrAuthorOrStaff;

    const NAME: &'static str = "Comment";
    const OPERATIONS: Operations = Operations::ALL;

    async fn list(
        &self,
        scope: &ReviewScope,
        _filter: &NoFilter,
        page: &PaginationQuery,
    ) -> Result<(Vec<CommentResponseDto>, i64)> {
        self.ensure_review(scope).await?;

        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "{} WHERE c.review_id = $1 ORDER BY c.pub_date DESC, c.id DESC LIMIT $2 OFFSET $3",
            COMMENT_SELECT
        ))
        .bind(scope.review_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(scope.review_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count comments: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn retrieve(&self, key: &CommentKey) -> Result<CommentResponseDto> {
        sqlx::query_as::<_, CommentRow>(&format!(
            "{} WHERE c.id = $1 AND c.review_id = $2 AND r.title_id = $3",
            COMMENT_SELECT
        ))
        .bind(key.comment_id)
        .bind(key.review_id)
        .bind(key.title_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get comment {}: {:?}", key.comment_id, e);
            AppError::Database(e)
        })?
        .map(Into::into)
        .ok_or_else(|| not_found(key))
    }

    async fn create(
        &self,
        actor: &AuthenticatedUser,
        scope: &ReviewScope,
        input: CommentTextDto,
    ) -> Result<CommentResponseDto> {
        self.ensure_review(scope).await?;

        let comment_id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (review_id, author_id, text) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(scope.review_id)
        .bind(actor.id)
        .bind(&input.text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Comment already exists"))?;

        tracing::info!(
            "Comment created: id={}, review_id={}, author={}",
            comment_id,
            scope.review_id,
            actor.username
        );

        self.retrieve(&CommentKey {
            title_id: scope.title_id,
            review_id: scope.review_id,
            comment_id,
        })
        .await
    }

    async fn update(&self, key: &CommentKey, input: CommentTextDto) -> Result<CommentResponseDto> {
        let result = sqlx::query(
            r#"
            UPDATE comments c SET text = $4
            FROM reviews r
            WHERE c.id = $1 AND c.review_id = $2 AND r.id = c.review_id AND r.title_id = $3
            "#,
        )
        .bind(key.comment_id)
        .bind(key.review_id)
        .bind(key.title_id)
        .bind(&input.text)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update comment: {:?}", e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(not_found(key));
        }

        tracing::info!("Comment updated: id={}", key.comment_id);
        self.retrieve(key).await
    }

    async fn destroy(&self, key: &CommentKey) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments c
            USING reviews r
            WHERE c.id = $1 AND c.review_id = $2 AND r.id = c.review_id AND r.title_id = $3
            "#,
        )
        .bind(key.comment_id)
        .bind(key.review_id)
        .bind(key.title_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete comment: {:?}", e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(not_found(key));
        }

        tracing::info!("Comment deleted: id={}", key.comment_id);
        Ok(())
    }

    async fn owner(&self, key: &CommentKey) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT c.author_id
            FROM comments c
            JOIN reviews r ON r.id = c.review_id
            WHERE c.id = $1 AND c.review_id = $2 AND r.title_id = $3
            "#,
        )
        .bind(key.comment_id)
        .bind(key.review_id)
        .bind(key.title_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load comment author: {:?}", e);
            AppError::Database(e)
        })?
        .map(Some)
        .ok_or_else(|| not_found(key))
    }
}
