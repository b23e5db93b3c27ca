//! Authorization guards for the application.
//!
//! [`Guard`] runs a [`Permission`] against the caller before any other
//! extractor touches the body, so rejected requests never reach a service.
//!
//! Roles (from highest to lowest):
//! - admin (or superuser): full control of the catalog and of users
//! - moderator: may edit or delete any review and comment
//! - user: may write reviews and comments and edit their own

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::error::AppError;
use crate::core::permissions::Permission;
use crate::features::auth::model::Actor;

/// Extracts the caller and checks the endpoint-level permission `P`.
///
/// # Example
/// ```ignore
/// pub async fn handler(Guard(actor, _): Guard<ReadOnlyOrAdmin>) { ... }
/// ```
pub struct Guard<P>(pub Actor, pub PhantomData<P>);

impl<P, S> FromRequestParts<S> for Guard<P>
where
    P: Permission + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = Actor::from_request_parts(parts, state).await?;

        if !P::default().has_permission(&actor, &parts.method) {
            return Err(deny(&actor));
        }

        Ok(Guard(actor, PhantomData))
    }
}

/// Anonymous callers get 401 so clients know to authenticate; everyone else 403.
pub fn deny(actor: &Actor) -> AppError {
    if actor.is_authenticated() {
        AppError::Forbidden("You do not have permission to perform this action".to_string())
    } else {
        AppError::Unauthorized("Authentication credentials were not provided".to_string())
    }
}
