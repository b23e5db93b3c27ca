use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::models::{Role, User};
use crate::shared::validation::{validate_username, USERNAME_REGEX};

/// Public representation of an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<User> for UserResponseDto {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

/// Admin payload for `POST /users`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
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

    #[serde(default)]
    #[validate(length(max = 150, message = "First name must not exceed 150 characters"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Last name must not exceed 150 characters"))]
    pub last_name: String,

    #[serde(default)]
    pub bio: String,

    #[serde(default)]
    pub role: Role,
}

/// Admin payload for `PATCH /users/{username}`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may contain only letters, digits and @/./+/-/_"),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,

    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must not exceed 254 characters")
    )]
    pub email: Option<String>,

    #[validate(length(max = 150, message = "First name must not exceed 150 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 150, message = "Last name must not exceed 150 characters"))]
    pub last_name: Option<String>,

    pub bio: Option<String>,

    pub role: Option<Role>,
}

/// Self-service payload for `PATCH /users/me`.
///
/// Has no `role` field, so a role sent by the client is dropped during
/// deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may contain only letters, digits and @/./+/-/_"),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,

    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must not exceed 254 characters")
    )]
    pub email: Option<String>,

    #[validate(length(max = 150, message = "First name must not exceed 150 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 150, message = "Last name must not exceed 150 characters"))]
    pub last_name: Option<String>,

    pub bio: Option<String>,
}

impl From<UpdateProfileDto> for UpdateUserDto {
    fn from(dto: UpdateProfileDto) -> Self {
        Self {
            username: dto.username,
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            bio: dto.bio,
            role: None,
        }
    }
}
