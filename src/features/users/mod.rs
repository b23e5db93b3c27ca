//! Accounts, admin user management and the caller's own profile.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/users` | List users, `?search=` on username (admin) |
//! | POST | `/users` | Create a user with any role (admin) |
//! | GET/PATCH/DELETE | `/users/{username}` | Manage one user (admin) |
//! | GET | `/users/me` | Caller's profile |
//! | PATCH | `/users/me` | Update caller's profile; `role` is ignored |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
