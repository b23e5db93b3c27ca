//! Reviews of titles and comments on reviews.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET/POST | `/titles/{title_id}/reviews` | List or create (one per author per title) |
//! | GET/PATCH/DELETE | `/titles/{title_id}/reviews/{review_id}` | Retrieve, edit or delete |
//! | GET/POST | `/titles/{title_id}/reviews/{review_id}/comments` | List or create |
//! | GET/PATCH/DELETE | `.../comments/{comment_id}` | Retrieve, edit or delete |
//!
//! Edits and deletes are allowed to the author, moderators and admins.

pub mod dtos;
pub mod models;
pub mod routes;
pub mod services;
