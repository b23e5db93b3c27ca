use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AccessClaims, ACCESS_TOKEN_TYPE};

/// Issues and validates HS256 access tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    leeway: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: config.token_ttl,
            leeway: config.jwt_leeway.as_secs(),
        }
    }

    pub fn issue(&self, user_id: i64, username: &str) -> Result<String> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = AccessClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign access token: {}", e);
            AppError::Internal("Failed to issue token".to_string())
        })
    }

    pub fn validate(&self, token: &str) -> Result<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Rejected access token: {}", e);
                AppError::Unauthorized("Invalid or expired token".to_string())
            })?
            .claims;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(AppError::Unauthorized(
                "Token is not an access token".to_string(),
            ));
        }

        Ok(claims)
    }

    /// User id carried in the `sub` claim
    pub fn user_id(claims: &AccessClaims) -> Result<i64> {
        claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}
