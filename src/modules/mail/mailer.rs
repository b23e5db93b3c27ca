//! Outgoing email delivery.
//!
//! Two backends:
//! - console: writes the message to the log, for development and tests
//! - http: POSTs JSON to a transactional mail API with a bearer token

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::config::{MailBackend, MailConfig};
use crate::core::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

/// Logs messages instead of delivering them
#[derive(Debug, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "Email (console backend):\n{}",
            message.text
        );
        Ok(())
    }
}

/// Delivers messages through an HTTP mail API
pub struct HttpMailer {
    http_client: Client,
    api_url: String,
    api_token: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, AppError> {
        let api_url = config
            .api_url
            .clone()
            .ok_or_else(|| AppError::Internal("MAIL_API_URL is not set".to_string()))?;
        let api_token = config
            .api_token
            .clone()
            .ok_or_else(|| AppError::Internal("MAIL_API_TOKEN is not set".to_string()))?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build mail HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url,
            api_token,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        debug!("Sending email to {} via {}", message.to, self.api_url);

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                warn!("Mail API request failed: {}", e);
                AppError::ExternalServiceError("Failed to send email".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Mail API responded {}: {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Mail API responded with status {}",
                status
            )));
        }

        info!("Email sent to {}", message.to);
        Ok(())
    }
}

/// Build the mailer selected by `MAIL_BACKEND`.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, AppError> {
    match config.backend {
        MailBackend::Console => Ok(Arc::new(ConsoleMailer)),
        MailBackend::Http => Ok(Arc::new(HttpMailer::new(config)?)),
    }
}
