pub mod auth;
pub mod categories;
pub mod reviews;
pub mod titles;
pub mod users;
