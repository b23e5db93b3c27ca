use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::Taxon;
use crate::shared::validation::SLUG_REGEX;

/// Category or genre as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaxonResponseDto {
    pub name: String,
    pub slug: String,
}

impl From<Taxon> for TaxonResponseDto {
    fn from(t: Taxon) -> Self {
        Self {
            name: t.name,
            slug: t.slug,
        }
    }
}

/// Request DTO for creating a category or genre
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTaxonDto {
    #[validate(length(min = 1, max = 256, message = "Name must be 1-256 characters"))]
    pub name: String,

    #[validate(
        length(min = 1, max = 50, message = "Slug must be 1-50 characters"),
        regex(path = *SLUG_REGEX, message = "Slug may contain only latin letters, digits, '-' and '_'")
    )]
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(name: &str, slug: &str) -> CreateTaxonDto {
        CreateTaxonDto {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn test_valid_taxon() {
        assert!(dto("Science fiction", "sci-fi").validate().is_ok());
        assert!(dto("Rock", "rock_n_roll").validate().is_ok());
    }

    #[test]
    fn test_invalid_taxon() {
        assert!(dto("", "empty-name").validate().is_err());
        assert!(dto("Jazz", "jazz!").validate().is_err());
        assert!(dto("Фильм", "фильм").validate().is_err());
        assert!(dto("Long", &"a".repeat(51)).validate().is_err());
        assert!(dto(&"n".repeat(257), "long-name").validate().is_err());
    }
}
