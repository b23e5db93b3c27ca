use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validation::{validate_username, USERNAME_REGEX};

/// Request DTO for `POST /auth/signup`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignUpRequestDto {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may contain only letters, digits and @/./+/-/_"),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must not exceed 254 characters")
    )]
    pub email: String,
}

/// Echo of the accepted sign-up request; the code itself is sent by email
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignUpResponseDto {
    pub username: String,
    pub email: String,
}

/// Request DTO for `POST /auth/token`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TokenRequestDto {
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Confirmation code is required"))]
    pub confirmation_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponseDto {
    /// Bearer access token
    pub token: String,
}
