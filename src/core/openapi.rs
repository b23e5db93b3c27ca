use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::Server;
use utoipa::{Modify, OpenApi};

use crate::features::auth::{self, dtos as auth_dtos};
use crate::features::categories::dtos as categories_dtos;
use crate::features::reviews::dtos as reviews_dtos;
use crate::features::titles::dtos as titles_dtos;
use crate::features::users::{dtos as users_dtos, handlers::profile_handler, models::Role};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::signup,
        auth::handlers::token,
        // Users
        profile_handler::get_profile,
        profile_handler::update_profile,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Role,
            // Auth
            auth_dtos::SignUpRequestDto,
            auth_dtos::SignUpResponseDto,
            auth_dtos::TokenRequestDto,
            auth_dtos::TokenResponseDto,
            ApiResponse<auth_dtos::SignUpResponseDto>,
            ApiResponse<auth_dtos::TokenResponseDto>,
            // Users
            users_dtos::UserResponseDto,
            users_dtos::CreateUserDto,
            users_dtos::UpdateUserDto,
            users_dtos::UpdateProfileDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            // Categories & genres
            categories_dtos::TaxonResponseDto,
            categories_dtos::CreateTaxonDto,
            ApiResponse<Vec<categories_dtos::TaxonResponseDto>>,
            // Titles
            titles_dtos::TitleResponseDto,
            titles_dtos::CreateTitleDto,
            titles_dtos::UpdateTitleDto,
            ApiResponse<titles_dtos::TitleResponseDto>,
            ApiResponse<Vec<titles_dtos::TitleResponseDto>>,
            // Reviews & comments
            reviews_dtos::ReviewResponseDto,
            reviews_dtos::CreateReviewDto,
            reviews_dtos::UpdateReviewDto,
            reviews_dtos::CommentResponseDto,
            reviews_dtos::CommentTextDto,
            ApiResponse<reviews_dtos::ReviewResponseDto>,
            ApiResponse<Vec<reviews_dtos::ReviewResponseDto>>,
            ApiResponse<reviews_dtos::CommentResponseDto>,
            ApiResponse<Vec<reviews_dtos::CommentResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Email-code sign-up and token exchange"),
        (name = "users", description = "Own profile and user management"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "YaMDb API",
        version = "0.1.0",
        description = "Reviews of books, films and music",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
    /// Documented paths are relative to this prefix
    pub api_prefix: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
        if !self.api_prefix.is_empty() {
            openapi.servers = Some(vec![Server::new(self.api_prefix.clone())]);
        }
    }
}
