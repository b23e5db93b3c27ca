//! Categories and genres.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/categories`, `/genres` | List ordered by name, `?search=` on name |
//! | POST | `/categories`, `/genres` | Create (admin) |
//! | DELETE | `/categories/{slug}`, `/genres/{slug}` | Delete (admin) |

pub mod dtos;
pub mod models;
pub mod routes;
pub mod services;
