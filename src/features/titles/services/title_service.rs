use async_trait::async_trait;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};

use crate::core::error::{AppError, Result};
use crate::core::permissions::ReadOnlyOrAdmin;
use crate::core::resource::{Operations, Resource, Unscoped};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::titles::dtos::{
    CreateTitleDto, TitleFilter, TitleResponseDto, UpdateTitleDto,
};
use crate::features::titles::models::{TitleGenre, TitleRow};
use crate::shared::types::PaginationQuery;

const TITLE_SELECT: &str = r#"
    SELECT t.id, t.name, t.year, t.description,
           c.name AS category_name, c.slug AS category_slug,
           (SELECT AVG(r.score)::float8 FROM reviews r WHERE r.title_id = t.id) AS rating
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

const TITLE_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR t.name ILIKE '%' || $1 || '%')
      AND ($2::smallint IS NULL OR t.year = $2)
      AND ($3::text IS NULL OR c.slug = $3)
      AND ($4::text IS NULL OR EXISTS (
            SELECT 1 FROM genre_title gt
            JOIN genres g ON g.id = gt.genre_id
            WHERE gt.title_id = t.id AND g.slug = $4))
"#;

/// Item path of `/titles/{title_id}`
#[derive(Debug, Deserialize)]
pub struct TitleKey {
    pub title_id: i64,
}

/// Service for titles with their genres, category and rating
pub struct TitleService {
    pool: PgPool,
}

impl TitleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn genres_for(&self, title_ids: &[i64]) -> Result<Vec<TitleGenre>> {
        sqlx::query_as::<_, TitleGenre>(
            r#"
            SELECT gt.title_id, g.name, g.slug
            FROM genre_title gt
            JOIN genres g ON g.id = gt.genre_id
            WHERE gt.title_id = ANY($1)
            ORDER BY g.name
            "#,
        )
        .bind(title_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load title genres: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn get(&self, id: i64) -> Result<TitleResponseDto> {
        let row = sqlx::query_as::<_, TitleRow>(&format!("{} WHERE t.id = $1", TITLE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get title {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Title {} not found", id)))?;

        let genres = self.genres_for(&[id]).await?;
        TitleResponseDto::assemble(vec![row], genres)
            .pop()
            .ok_or_else(|| AppError::Internal("Title row lost during assembly".to_string()))
    }
}

async fn resolve_category(conn: &mut PgConnection, slug: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::from_db(e, "Category lookup failed"))?
        .ok_or_else(|| AppError::BadRequest(format!("Category '{}' does not exist", slug)))
}

/// Genre ids for `slugs`; any unknown slug rejects the whole request
async fn resolve_genres(conn: &mut PgConnection, slugs: &[String]) -> Result<Vec<i64>> {
    let mut wanted = slugs.to_vec();
    wanted.sort();
    wanted.dedup();

    let found: Vec<(i64, String)> = sqlx::query_as("SELECT id, slug FROM genres WHERE slug = ANY($1)")
        .bind(&wanted)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::from_db(e, "Genre lookup failed"))?;

    if found.len() != wanted.len() {
        let missing: Vec<&str> = wanted
            .iter()
            .filter(|s| !found.iter().any(|(_, slug)| slug == *s))
            .map(String::as_str)
            .collect();
        return Err(AppError::BadRequest(format!(
            "Unknown genre slug(s): {}",
            missing.join(", ")
        )));
    }

    Ok(found.into_iter().map(|(id, _)| id).collect())
}

async fn link_genres(conn: &mut PgConnection, title_id: i64, genre_ids: &[i64]) -> Result<()> {
    sqlx::query(
        "INSERT INTO genre_title (title_id, genre_id) SELECT $1, UNNEST($2::bigint[])",
    )
    .bind(title_id)
    .bind(genre_ids)
    .execute(conn)
    .await
    .map_err(|e| AppError::from_db(e, "Genre is already linked to this title"))?;
    Ok(())
}

#[async_trait]
impl Resource for TitleService {
    type Scope = Unscoped;
    type Key = TitleKey;
    type Filter = TitleFilter;
    type Create = CreateTitleDto;
    type Update = UpdateTitleDto;
    type Output = TitleResponseDto;
    type Permission = ReadOnlyOrAdmin;

    const NAME: &'static str = "Title";
    const OPERATIONS: Operations = Operations::ALL;

    async fn list(
        &self,
        _scope: &Unscoped,
        filter: &TitleFilter,
        page: &PaginationQuery,
    ) -> Result<(Vec<TitleResponseDto>, i64)> {
        let rows = sqlx::query_as::<_, TitleRow>(&format!(
            "{} {} ORDER BY t.created_at DESC, t.id DESC LIMIT $5 OFFSET $6",
            TITLE_SELECT, TITLE_FILTER
        ))
        .bind(filter.name.as_deref())
        .bind(filter.year)
        .bind(filter.category.as_deref())
        .bind(filter.genre.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list titles: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM titles t LEFT JOIN categories c ON c.id = t.category_id {}",
            TITLE_FILTER
        ))
        .bind(filter.name.as_deref())
        .bind(filter.year)
        .bind(filter.category.as_deref())
        .bind(filter.genre.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count titles: {:?}", e);
            AppError::Database(e)
        })?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let genres = self.genres_for(&ids).await?;

        Ok((TitleResponseDto::assemble(rows, genres), total))
    }

    async fn retrieve(&self, key: &TitleKey) -> Result<TitleResponseDto> {
        self.get(key.title_id).await
    }

    async fn create(
        &self,
        actor: &AuthenticatedUser,
        _scope: &Unscoped,
        input: CreateTitleDto,
    ) -> Result<TitleResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let category_id = match input.category.as_deref() {
            Some(slug) => Some(resolve_category(&mut tx, slug).await?),
            None => None,
        };
        let genre_ids = resolve_genres(&mut tx, &input.genre).await?;

        let title_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO titles (name, year, description, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(input.year)
        .bind(input.description.as_deref())
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, "Title already exists"))?;

        link_genres(&mut tx, title_id, &genre_ids).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Title created: id={}, by={}", title_id, actor.username);
        self.get(title_id).await
    }

    async fn update(&self, key: &TitleKey, input: UpdateTitleDto) -> Result<TitleResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let category_id = match input.category.as_ref() {
            Some(Some(slug)) => Some(Some(resolve_category(&mut tx, slug).await?)),
            Some(None) => Some(None),
            None => None,
        };

        let result = sqlx::query(
            r#"
            UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = COALESCE($4, description),
                category_id = CASE WHEN $5 THEN $6 ELSE category_id END
            WHERE id = $1
            "#,
        )
        .bind(key.title_id)
        .bind(input.name.as_deref())
        .bind(input.year)
        .bind(input.description.as_deref())
        .bind(category_id.is_some())
        .bind(category_id.flatten())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, "Title already exists"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Title {} not found", key.title_id)));
        }

        if let Some(slugs) = input.genre.as_deref() {
            let genre_ids = resolve_genres(&mut tx, slugs).await?;
            sqlx::query("DELETE FROM genre_title WHERE title_id = $1")
                .bind(key.title_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            link_genres(&mut tx, key.title_id, &genre_ids).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Title updated: id={}", key.title_id);
        self.get(key.title_id).await
    }

    async fn destroy(&self, key: &TitleKey) -> Result<()> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(key.title_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete title: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Title {} not found", key.title_id)));
        }

        tracing::info!("Title deleted: id={}", key.title_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::dtos::CreateTaxonDto;
    use crate::features::categories::services::{CategoryService, GenreService, SlugKey};
    use crate::shared::test_helpers::create_superuser;

    async fn seed_taxonomy(pool: &PgPool) {
        let admin = create_superuser();
        let categories = CategoryService::new(pool.clone());
        let genres = GenreService::new(pool.clone());
        for (name, slug) in [("Books", "books"), ("Films", "films")] {
            categories
                .create(&admin, &Unscoped {}, CreateTaxonDto { name: name.into(), slug: slug.into() })
                .await
                .unwrap();
        }
        for (name, slug) in [("Drama", "drama"), ("Sci-Fi", "sci-fi")] {
            genres
                .create(&admin, &Unscoped {}, CreateTaxonDto { name: name.into(), slug: slug.into() })
                .await
                .unwrap();
        }
    }

    fn dune() -> CreateTitleDto {
        CreateTitleDto {
            name: "Dune".to_string(),
            year: 1965,
            description: Some("Spice".to_string()),
            genre: vec!["sci-fi".to_string(), "drama".to_string()],
            category: Some("books".to_string()),
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_and_read_shape(pool: PgPool) {
        seed_taxonomy(&pool).await;
        let service = TitleService::new(pool);

        let title = service
            .create(&create_superuser(), &Unscoped {}, dune())
            .await
            .unwrap();

        assert_eq!(title.name, "Dune");
        assert_eq!(title.rating, None);
        assert_eq!(title.category.unwrap().slug, "books");
        let slugs: Vec<_> = title.genre.iter().map(|g| g.slug.as_str()).collect();
        assert_eq!(slugs, ["drama", "sci-fi"]);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unknown_slugs_are_rejected(pool: PgPool) {
        seed_taxonomy(&pool).await;
        let service = TitleService::new(pool);
        let admin = create_superuser();

        let mut bad_genre = dune();
        bad_genre.genre.push("polka".to_string());
        assert!(matches!(
            service.create(&admin, &Unscoped {}, bad_genre).await,
            Err(AppError::BadRequest(_))
        ));

        let mut bad_category = dune();
        bad_category.category = Some("comics".to_string());
        assert!(matches!(
            service.create(&admin, &Unscoped {}, bad_category).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_filters(pool: PgPool) {
        seed_taxonomy(&pool).await;
        let service = TitleService::new(pool);
        let admin = create_superuser();
        service.create(&admin, &Unscoped {}, dune()).await.unwrap();
        service
            .create(
                &admin,
                &Unscoped {},
                CreateTitleDto {
                    name: "Solaris".to_string(),
                    year: 1972,
                    description: None,
                    genre: vec!["drama".to_string()],
                    category: Some("films".to_string()),
                },
            )
            .await
            .unwrap();

        let page = PaginationQuery::default();

        let filter = TitleFilter {
            name: Some("dun".into()),
            ..Default::default()
        };
        let (_, total) = service
            .list(&Unscoped {}, &filter, &page)
            .await
            .unwrap();
        assert_eq!(total, 1);

        let filter = TitleFilter {
            genre: Some("drama".into()),
            ..Default::default()
        };
        let (_, total) = service
            .list(&Unscoped {}, &filter, &page)
            .await
            .unwrap();
        assert_eq!(total, 2);

        let filter = TitleFilter {
            category: Some("films".into()),
            year: Some(1972),
            ..Default::default()
        };
        let (found, _) = service
            .list(&Unscoped {}, &filter, &page)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Solaris");
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_patch_and_category_deletion(pool: PgPool) {
        seed_taxonomy(&pool).await;
        let service = TitleService::new(pool.clone());
        let created = service
            .create(&create_superuser(), &Unscoped {}, dune())
            .await
            .unwrap();
        let key = TitleKey { title_id: created.id };

        let updated = service
            .update(
                &key,
                UpdateTitleDto {
                    genre: Some(vec!["drama".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Dune");
        assert_eq!(updated.genre.len(), 1);

        CategoryService::new(pool)
            .destroy(&SlugKey { slug: "books".to_string() })
            .await
            .unwrap();
        let after = service.retrieve(&key).await.unwrap();
        assert!(after.category.is_none());
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_genre_deletion_unlinks_title(pool: PgPool) {
        seed_taxonomy(&pool).await;
        let service = TitleService::new(pool.clone());
        let created = service
            .create(&create_superuser(), &Unscoped {}, dune())
            .await
            .unwrap();
        let key = TitleKey { title_id: created.id };

        GenreService::new(pool)
            .destroy(&SlugKey { slug: "drama".to_string() })
            .await
            .unwrap();

        let after = service.retrieve(&key).await.unwrap();
        let slugs: Vec<_> = after.genre.iter().map(|g| g.slug.as_str()).collect();
        assert_eq!(slugs, ["sci-fi"]);
        assert_eq!(after.category.unwrap().slug, "books");

        let filter = TitleFilter {
            genre: Some("drama".into()),
            ..Default::default()
        };
        let (_, total) = service
            .list(&Unscoped {}, &filter, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 0);
    }
}
