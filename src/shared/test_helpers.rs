#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;
#[cfg(test)]
use crate::features::users::models::Role;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, Router};

#[cfg(test)]
pub fn create_user(id: i64, role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        id,
        username: format!("{}_{}", role, id),
        role,
        is_superuser: false,
    }
}

#[cfg(test)]
pub fn create_superuser() -> AuthenticatedUser {
    AuthenticatedUser {
        id: 1000,
        username: "root".to_string(),
        role: Role::User,
        is_superuser: true,
    }
}

/// Attach `user` to every request, as the auth middleware would after
/// validating a token.
#[cfg(test)]
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
