//! Email-code sign-up and bearer token exchange.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/auth/signup` | Create or fetch an account and mail a confirmation code |
//! | POST | `/auth/token` | Exchange username + confirmation code for a JWT |

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;
