use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    SignUpRequestDto, SignUpResponseDto, TokenRequestDto, TokenResponseDto,
};
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

/// Register (or re-register) and receive a confirmation code by email
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignUpRequestDto,
    responses(
        (status = 200, description = "Confirmation code sent; `data` echoes the username and email", body = ApiResponse<SignUpResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email belongs to another account"),
        (status = 502, description = "Email could not be delivered")
    ),
    tag = "auth"
)]
pub async fn signup(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<SignUpRequestDto>,
) -> Result<Json<ApiResponse<SignUpResponseDto>>> {
    dto.validate()?;

    let response = service.signup(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(response),
        Some("Confirmation code sent".to_string()),
        None,
    )))
}

/// Exchange username and confirmation code for an access token.
///
/// Like every endpoint, the body is the `ApiResponse` envelope, so the token
/// is at `data.token`.
#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = TokenRequestDto,
    responses(
        (status = 201, description = "Token issued, wrapped in the response envelope as `data.token`", body = ApiResponse<TokenResponseDto>),
        (status = 400, description = "Invalid confirmation code"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn token(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<TokenRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<TokenResponseDto>>)> {
    dto.validate()?;

    let response = service.token(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}
