//! Role-based access predicates consulted by the resource router.
//!
//! A permission answers two questions:
//! - may this caller use the endpoint at all (`has_permission`)
//! - may this caller touch this particular object (`has_object_permission`)
//!
//! Policies are composed with [`Or`], so "read-only OR admin" is
//! `Or<ReadOnly, IsAdmin>`.

use axum::http::Method;

use crate::features::auth::model::Actor;

pub trait Permission: Send + Sync + 'static {
    fn has_permission(&self, actor: &Actor, method: &Method) -> bool;

    /// `owner_id` is the author of the object, when the object has one.
    fn has_object_permission(&self, actor: &Actor, method: &Method, owner_id: Option<i64>) -> bool {
        let _ = owner_id;
        self.has_permission(actor, method)
    }
}

pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Anyone may read
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnly;

impl Permission for ReadOnly {
    fn has_permission(&self, _actor: &Actor, method: &Method) -> bool {
        is_safe_method(method)
    }
}

/// Admin role or superuser
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAdmin;

impl Permission for IsAdmin {
    fn has_permission(&self, actor: &Actor, _method: &Method) -> bool {
        actor.is_admin()
    }
}

/// Any authenticated user may create; only the author, moderators and admins
/// may modify an existing object.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthorOrStaff;

impl Permission for IsAuthorOrStaff {
    fn has_permission(&self, actor: &Actor, _method: &Method) -> bool {
        actor.is_authenticated()
    }

    fn has_object_permission(&self, actor: &Actor, _method: &Method, owner_id: Option<i64>) -> bool {
        match actor.user() {
            Some(user) => user.is_staff() || owner_id == Some(user.id),
            None => false,
        }
    }
}

/// Grants access when either side does
#[derive(Debug, Clone, Copy, Default)]
pub struct Or<A, B>(pub A, pub B);

impl<A: Permission, B: Permission> Permission for Or<A, B> {
    fn has_permission(&self, actor: &Actor, method: &Method) -> bool {
        self.0.has_permission(actor, method) || self.1.has_permission(actor, method)
    }

    fn has_object_permission(&self, actor: &Actor, method: &Method, owner_id: Option<i64>) -> bool {
        self.0.has_object_permission(actor, method, owner_id)
            || self.1.has_object_permission(actor, method, owner_id)
    }
}

pub type ReadOnlyOrAdmin = Or<ReadOnly, IsAdmin>;

pub type ReadOnlyOrAuthorOrStaff = Or<ReadOnly, IsAuthorOrStaff>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::users::models::Role;

    fn actor(id: i64, role: Role) -> Actor {
        Actor::User(AuthenticatedUser {
            id,
            username: format!("user{}", id),
            role,
            is_superuser: false,
        })
    }

    fn superuser() -> Actor {
        Actor::User(AuthenticatedUser {
            id: 99,
            username: "root".to_string(),
            role: Role::User,
            is_superuser: true,
        })
    }

    #[test]
    fn test_catalog_policy_reads_are_public() {
        let policy = ReadOnlyOrAdmin::default();
        assert!(policy.has_permission(&Actor::Anonymous, &Method::GET));
        assert!(policy.has_permission(&actor(1, Role::User), &Method::GET));
    }

    #[test]
    fn test_catalog_policy_writes_need_admin() {
        let policy = ReadOnlyOrAdmin::default();
        for method in [Method::POST, Method::PATCH, Method::DELETE] {
            assert!(!policy.has_permission(&Actor::Anonymous, &method));
            assert!(!policy.has_permission(&actor(1, Role::User), &method));
            assert!(!policy.has_permission(&actor(2, Role::Moderator), &method));
            assert!(policy.has_permission(&actor(3, Role::Admin), &method));
            assert!(policy.has_permission(&superuser(), &method));
        }
    }

    #[test]
    fn test_review_policy_create_needs_authentication() {
        let policy = ReadOnlyOrAuthorOrStaff::default();
        assert!(!policy.has_permission(&Actor::Anonymous, &Method::POST));
        assert!(policy.has_permission(&actor(1, Role::User), &Method::POST));
    }

    #[test]
    fn test_review_policy_object_level() {
        let policy = ReadOnlyOrAuthorOrStaff::default();
        let author = 1;

        assert!(policy.has_object_permission(&actor(author, Role::User), &Method::PATCH, Some(author)));
        assert!(!policy.has_object_permission(&actor(2, Role::User), &Method::PATCH, Some(author)));
        assert!(!policy.has_object_permission(&actor(2, Role::User), &Method::DELETE, Some(author)));
        assert!(policy.has_object_permission(&actor(3, Role::Moderator), &Method::DELETE, Some(author)));
        assert!(policy.has_object_permission(&actor(4, Role::Admin), &Method::PATCH, Some(author)));
        assert!(policy.has_object_permission(&superuser(), &Method::DELETE, Some(author)));
        assert!(!policy.has_object_permission(&Actor::Anonymous, &Method::DELETE, Some(author)));
        assert!(policy.has_object_permission(&Actor::Anonymous, &Method::GET, Some(author)));
    }

    #[test]
    fn test_moderator_cannot_edit_catalog() {
        let policy = ReadOnlyOrAdmin::default();
        assert!(!policy.has_object_permission(&actor(2, Role::Moderator), &Method::PATCH, None));
    }
}
