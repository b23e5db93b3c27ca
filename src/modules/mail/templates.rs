//! Email bodies rendered with Jinja2 syntax.
//!
//! Templates are compiled into the binary from `templates/mail/`.

use minijinja::{context, Environment};
use std::sync::OnceLock;

use crate::core::error::AppError;

const CONFIRMATION_CODE: &str = "confirmation_code.jinja";

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    if let Err(e) = env.add_template(
        CONFIRMATION_CODE,
        include_str!("../../../templates/mail/confirmation_code.jinja"),
    ) {
        tracing::error!("Failed to load template {}: {}", CONFIRMATION_CODE, e);
    }
    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Body of the sign-up email carrying a confirmation code.
pub fn render_confirmation_code(
    username: &str,
    confirmation_code: &str,
    token_endpoint: &str,
) -> Result<String, AppError> {
    let template = get_environment()
        .get_template(CONFIRMATION_CODE)
        .map_err(|e| AppError::Internal(format!("Mail template unavailable: {}", e)))?;

    template
        .render(context! {
            username => username,
            confirmation_code => confirmation_code,
            token_endpoint => token_endpoint,
        })
        .map_err(|e| AppError::Internal(format!("Failed to render mail template: {}", e)))
}
