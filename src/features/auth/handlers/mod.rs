pub mod auth_handler;

pub use auth_handler::{__path_signup, __path_token, signup, token};
