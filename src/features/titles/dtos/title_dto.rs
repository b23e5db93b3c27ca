use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::categories::dtos::TaxonResponseDto;
use crate::features::titles::models::{TitleGenre, TitleRow};
use crate::shared::validation::validate_year;

/// Title as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TitleResponseDto {
    pub id: i64,
    pub name: String,
    pub year: i16,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<TaxonResponseDto>,
    pub category: Option<TaxonResponseDto>,
}

impl TitleResponseDto {
    /// Attach genres to their titles, keeping the order of `rows`
    pub fn assemble(rows: Vec<TitleRow>, genres: Vec<TitleGenre>) -> Vec<Self> {
        let mut by_title: HashMap<i64, Vec<TaxonResponseDto>> = HashMap::new();
        for g in genres {
            by_title.entry(g.title_id).or_default().push(TaxonResponseDto {
                name: g.name,
                slug: g.slug,
            });
        }

        rows.into_iter()
            .map(|row| {
                let genre = by_title.remove(&row.id).unwrap_or_default();
                Self::from_row(row, genre)
            })
            .collect()
    }

    fn from_row(row: TitleRow, genre: Vec<TaxonResponseDto>) -> Self {
        let category = match (row.category_name, row.category_slug) {
            (Some(name), Some(slug)) => Some(TaxonResponseDto { name, slug }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            year: row.year,
            rating: row.rating,
            description: row.description,
            genre,
            category,
        }
    }
}

/// Request DTO for creating a title; genres and category by slug
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTitleDto {
    #[validate(length(min = 1, max = 256, message = "Name must be 1-256 characters"))]
    pub name: String,

    #[validate(custom(function = "validate_year"))]
    pub year: i16,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "At least one genre is required"))]
    pub genre: Vec<String>,

    pub category: Option<String>,
}

/// Partial update of a title.
///
/// `category: null` detaches the category; an absent field keeps it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTitleDto {
    #[validate(length(min = 1, max = 256, message = "Name must be 1-256 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_year"))]
    pub year: Option<i16>,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "At least one genre is required"))]
    pub genre: Option<Vec<String>>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`)
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query filters for `GET /titles`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TitleFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub year: Option<i16>,
    /// Category slug
    pub category: Option<String>,
    /// Genre slug
    pub genre: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: i64, category: Option<(&str, &str)>, rating: Option<f64>) -> TitleRow {
        TitleRow {
            id,
            name: format!("Title {}", id),
            year: 2000,
            description: None,
            category_name: category.map(|c| c.0.to_string()),
            category_slug: category.map(|c| c.1.to_string()),
            rating,
        }
    }

    fn genre(title_id: i64, slug: &str) -> TitleGenre {
        TitleGenre {
            title_id,
            name: slug.to_uppercase(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn test_assemble_groups_genres_per_title() {
        let rows = vec![row(2, Some(("Films", "films")), Some(7.5)), row(1, None, None)];
        let genres = vec![genre(1, "drama"), genre(2, "comedy"), genre(2, "drama")];

        let titles = TitleResponseDto::assemble(rows, genres);

        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0].id, 2);
        assert_eq!(titles[0].genre.len(), 2);
        assert_eq!(titles[0].rating, Some(7.5));
        assert_eq!(
            titles[0].category,
            Some(TaxonResponseDto {
                name: "Films".to_string(),
                slug: "films".to_string()
            })
        );
        assert_eq!(titles[1].genre[0].slug, "drama");
        assert!(titles[1].category.is_none());
        assert!(titles[1].rating.is_none());
    }

    #[test]
    fn test_read_shape() {
        let titles = TitleResponseDto::assemble(vec![row(1, None, None)], vec![]);
        let value = serde_json::to_value(&titles[0]).unwrap();

        assert_eq!(value["rating"], serde_json::Value::Null);
        assert_eq!(value["category"], serde_json::Value::Null);
        assert_eq!(value["genre"], json!([]));
    }

    #[test]
    fn test_create_requires_genre_and_valid_year() {
        let dto: CreateTitleDto = serde_json::from_value(json!({
            "name": "Dune",
            "year": 1965,
            "genre": [],
            "category": "books"
        }))
        .unwrap();
        assert!(dto.validate().is_err());

        let dto: CreateTitleDto = serde_json::from_value(json!({
            "name": "Dune",
            "year": 1899,
            "genre": ["sci-fi"]
        }))
        .unwrap();
        assert!(dto.validate().is_err());

        let dto: CreateTitleDto = serde_json::from_value(json!({
            "name": "Dune",
            "year": 1965,
            "genre": ["sci-fi"]
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.category.is_none());
    }

    #[test]
    fn test_update_checks_year_only_when_present() {
        let dto: UpdateTitleDto = serde_json::from_value(json!({ "name": "X" })).unwrap();
        assert!(dto.validate().is_ok());

        let dto: UpdateTitleDto = serde_json::from_value(json!({ "year": 1899 })).unwrap();
        assert!(dto.validate().is_err());

        let dto: UpdateTitleDto = serde_json::from_value(json!({ "year": 1984 })).unwrap();
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_category_null_vs_absent() {
        let absent: UpdateTitleDto = serde_json::from_value(json!({ "name": "X" })).unwrap();
        assert_eq!(absent.category, None);

        let cleared: UpdateTitleDto = serde_json::from_value(json!({ "category": null })).unwrap();
        assert_eq!(cleared.category, Some(None));

        let set: UpdateTitleDto = serde_json::from_value(json!({ "category": "films" })).unwrap();
        assert_eq!(set.category, Some(Some("films".to_string())));
    }
}
