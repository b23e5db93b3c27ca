//! Mail module for account confirmation emails

mod mailer;
mod templates;

pub use mailer::{build_mailer, EmailMessage, Mailer};
pub use templates::render_confirmation_code;

#[cfg(test)]
pub use mailer::ConsoleMailer;
