pub mod confirmation_code;
pub mod token_service;

mod auth_service;

pub use auth_service::AuthService;
pub use confirmation_code::ConfirmationCodes;
pub use token_service::TokenService;
