use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::core::permissions::ReadOnlyOrAdmin;
use crate::core::resource::{Operations, Resource, Unscoped, Unsupported};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::{CreateTaxonDto, TaxonResponseDto};
use crate::features::categories::models::{CategoryKind, GenreKind, Taxon, TaxonomyKind};
use crate::shared::types::{PaginationQuery, SearchQuery};

/// Item path of `/categories/{slug}` and `/genres/{slug}`
#[derive(Debug, Deserialize)]
pub struct SlugKey {
    pub slug: String,
}

/// List, create and delete-by-slug for one taxonomy table
pub struct TaxonomyService<K> {
    pool: PgPool,
    _kind: PhantomData<fn() -> K>,
}

pub type CategoryService = TaxonomyService<CategoryKind>;

pub type GenreService = TaxonomyService<GenreKind>;

impl<K: TaxonomyKind> TaxonomyService<K> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<K: TaxonomyKind> Resource for TaxonomyService<K> {
    type Scope = Unscoped;
    type Key = SlugKey;
    type Filter = SearchQuery;
    type Create = CreateTaxonDto;
    type Update = Unsupported;
    type Output = TaxonResponseDto;
    type Permission = ReadOnlyOrAdmin;

    const NAME: &'static str = K::NAME;
    const OPERATIONS: Operations = Operations::LIST_CREATE_DESTROY;

    async fn list(
        &self,
        _scope: &Unscoped,
        filter: &SearchQuery,
        page: &PaginationQuery,
    ) -> Result<(Vec<TaxonResponseDto>, i64)> {
        let search = filter.term();

        let items = sqlx::query_as::<_, Taxon>(&format!(
            r#"
            SELECT name, slug
            FROM {}
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
            K::TABLE
        ))
        .bind(search)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list {}: {:?}", K::TABLE, e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')",
            K::TABLE
        ))
        .bind(search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count {}: {:?}", K::TABLE, e);
            AppError::Database(e)
        })?;

        Ok((items.into_iter().map(Into::into).collect(), total))
    }

    async fn create(
        &self,
        actor: &AuthenticatedUser,
        _scope: &Unscoped,
        input: CreateTaxonDto,
    ) -> Result<TaxonResponseDto> {
        let taxon = sqlx::query_as::<_, Taxon>(&format!(
            "INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING name, slug",
            K::TABLE
        ))
        .bind(&input.name)
        .bind(&input.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_db(
                e,
                &format!("{} with this name or slug already exists", K::NAME),
            )
        })?;

        tracing::info!(
            "{} created: slug={}, by={}",
            K::NAME,
            taxon.slug,
            actor.username
        );
        Ok(taxon.into())
    }

    async fn destroy(&self, key: &SlugKey) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE slug = $1", K::TABLE))
            .bind(&key.slug)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete from {}: {:?}", K::TABLE, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "{} '{}' not found",
                K::NAME,
                key.slug
            )));
        }

        tracing::info!("{} deleted: slug={}", K::NAME, key.slug);
        Ok(())
    }
}
