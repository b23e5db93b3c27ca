use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    SignUpRequestDto, SignUpResponseDto, TokenRequestDto, TokenResponseDto,
};
use crate::features::auth::services::confirmation_code::ConfirmationCodes;
use crate::features::auth::services::token_service::TokenService;
use crate::features::users::models::User;
use crate::features::users::services::{NewUser, UserService};
use crate::modules::mail::{render_confirmation_code, EmailMessage, Mailer};

const CONFIRMATION_SUBJECT: &str = "YaMDb confirmation code";

/// Service for the email-code sign-up flow and token exchange
pub struct AuthService {
    users: Arc<UserService>,
    tokens: Arc<TokenService>,
    codes: ConfirmationCodes,
    mailer: Arc<dyn Mailer>,
    mail_from: String,
    token_endpoint: String,
}

impl AuthService {
    pub fn new(
        users: Arc<UserService>,
        tokens: Arc<TokenService>,
        codes: ConfirmationCodes,
        mailer: Arc<dyn Mailer>,
        mail_from: String,
        api_prefix: &str,
    ) -> Self {
        Self {
            users,
            tokens,
            codes,
            mailer,
            mail_from,
            token_endpoint: format!("{}/auth/token", api_prefix),
        }
    }

    /// Create or fetch the account, then issue and mail a fresh code.
    ///
    /// Repeating sign-up with the same username and email replaces the
    /// outstanding code. A username or email held by another account is a
    /// conflict.
    pub async fn signup(&self, dto: SignUpRequestDto) -> Result<SignUpResponseDto> {
        let user = self.create_or_fetch(&dto).await?;

        let issued = self.codes.generate(user.id)?;
        self.users
            .set_confirmation_code(user.id, &issued.digest)
            .await?;

        let message = EmailMessage {
            from: self.mail_from.clone(),
            to: user.email.clone(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            text: render_confirmation_code(&user.username, &issued.code, &self.token_endpoint)?,
        };
        self.mailer.send(&message).await?;

        tracing::info!("Confirmation code issued: user_id={}", user.id);

        Ok(SignUpResponseDto {
            username: dto.username,
            email: dto.email,
        })
    }

    async fn create_or_fetch(&self, dto: &SignUpRequestDto) -> Result<User> {
        if let Some(user) = self.users.find_by_username(&dto.username).await? {
            if user.email != dto.email {
                return Err(AppError::Conflict(
                    "Username is already registered with another email".to_string(),
                ));
            }
            return Ok(user);
        }

        if self.users.find_by_email(&dto.email).await?.is_some() {
            return Err(AppError::Conflict(
                "Email is already registered with another username".to_string(),
            ));
        }

        self.users
            .insert(NewUser::signup(&dto.username, &dto.email))
            .await
    }

    /// Exchange a confirmation code for an access token, consuming the code.
    pub async fn token(&self, dto: TokenRequestDto) -> Result<TokenResponseDto> {
        let user = self
            .users
            .find_by_username(&dto.username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", dto.username)))?;

        let stored = user
            .confirmation_code
            .as_deref()
            .ok_or_else(invalid_code)?;

        if !self.codes.verify(user.id, &dto.confirmation_code, stored) {
            tracing::debug!("Confirmation code mismatch: user_id={}", user.id);
            return Err(invalid_code());
        }

        if !self.users.consume_confirmation_code(user.id, stored).await? {
            return Err(invalid_code());
        }

        let token = self.tokens.issue(user.id, &user.username)?;
        tracing::info!("Access token issued: user_id={}", user.id);

        Ok(TokenResponseDto { token })
    }
}

fn invalid_code() -> AppError {
    AppError::BadRequest("Invalid confirmation code".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;
    use async_trait::async_trait;
    use sqlx::PgPool;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
    }

    impl RecordingMailer {
        fn last_code(&self) -> String {
            let sent = self.sent.lock().unwrap();
            let text = &sent.last().expect("no email sent").text;
            text.split_whitespace()
                .find(|w| w.len() == 32 && w.chars().all(|c| c.is_ascii_hexdigit()))
                .expect("no code in email")
                .to_string()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<()> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _message: &EmailMessage) -> Result<()> {
            Err(AppError::ExternalServiceError("relay down".to_string()))
        }
    }

    fn service(pool: PgPool, mailer: Arc<dyn Mailer>) -> AuthService {
        let config = AuthConfig {
            jwt_secret: "secret".to_string(),
            token_ttl: Duration::from_secs(60),
            jwt_leeway: Duration::from_secs(0),
            confirmation_code_secret: "codes".to_string(),
        };
        AuthService::new(
            Arc::new(UserService::new(pool)),
            Arc::new(TokenService::new(&config)),
            ConfirmationCodes::new(&config.confirmation_code_secret),
            mailer,
            "admin@yamdb.com".to_string(),
            "/api/v1",
        )
    }

    fn signup(username: &str, email: &str) -> SignUpRequestDto {
        SignUpRequestDto {
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    fn token(username: &str, code: &str) -> TokenRequestDto {
        TokenRequestDto {
            username: username.to_string(),
            confirmation_code: code.to_string(),
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_signup_then_token(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let auth = service(pool, mailer.clone());

        let echoed = auth.signup(signup("bob", "bob@x.com")).await.unwrap();
        assert_eq!(echoed.username, "bob");
        assert_eq!(mailer.sent.lock().unwrap()[0].to, "bob@x.com");

        let code = mailer.last_code();
        assert!(matches!(
            auth.token(token("bob", "wrong")).await,
            Err(AppError::BadRequest(_))
        ));

        let issued = auth.token(token("bob", &code)).await.unwrap();
        assert!(!issued.token.is_empty());

        // single use
        assert!(matches!(
            auth.token(token("bob", &code)).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_resignup_replaces_code(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let auth = service(pool, mailer.clone());

        auth.signup(signup("bob", "bob@x.com")).await.unwrap();
        let first = mailer.last_code();
        auth.signup(signup("bob", "bob@x.com")).await.unwrap();
        let second = mailer.last_code();

        assert!(auth.token(token("bob", &first)).await.is_err());
        assert!(auth.token(token("bob", &second)).await.is_ok());
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_signup_conflicts(pool: PgPool) {
        let auth = service(pool, Arc::new(RecordingMailer::default()));
        auth.signup(signup("bob", "bob@x.com")).await.unwrap();

        assert!(matches!(
            auth.signup(signup("bob", "other@x.com")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            auth.signup(signup("robert", "bob@x.com")).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_token_for_unknown_user(pool: PgPool) {
        let auth = service(pool, Arc::new(RecordingMailer::default()));
        assert!(matches!(
            auth.token(token("ghost", "abc")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_mail_failure_fails_signup(pool: PgPool) {
        let auth = service(pool, Arc::new(FailingMailer));
        assert!(matches!(
            auth.signup(signup("bob", "bob@x.com")).await,
            Err(AppError::ExternalServiceError(_))
        ));
    }
}
