//! Titles (works under review) with genres, category and computed rating.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/titles` | List; filters `name`, `year`, `category`, `genre` |
//! | POST | `/titles` | Create (admin) |
//! | GET | `/titles/{title_id}` | Retrieve |
//! | PATCH/DELETE | `/titles/{title_id}` | Update or delete (admin) |

pub mod dtos;
pub mod models;
pub mod routes;
pub mod services;
