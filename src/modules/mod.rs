//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for services outside the database, such as mail delivery.

pub mod mail;
