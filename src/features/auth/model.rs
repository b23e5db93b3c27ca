use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::users::models::{Role, User};

/// Identity attached to a request by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub is_superuser: bool,
}

impl AuthenticatedUser {
    /// Check if user has admin rights (admin role or superuser)
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    /// Moderators and admins may edit content they do not own
    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.is_moderator()
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            is_superuser: user.is_superuser,
        }
    }
}

/// Caller of a request, authenticated or not.
#[derive(Debug, Clone, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    User(AuthenticatedUser),
}

impl Actor {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Actor::Anonymous => None,
            Actor::User(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(AuthenticatedUser::is_admin)
    }
}

/// Claims carried by access tokens issued at `/auth/token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id as a string
    pub sub: String,
    pub username: String,
    pub token_type: String,
    pub iat: u64,
    pub exp: u64,
}

pub const ACCESS_TOKEN_TYPE: &str = "access";
