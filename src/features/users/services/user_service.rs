use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::core::permissions::IsAdmin;
use crate::core::resource::{Operations, Resource, Unscoped};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{CreateUserDto, UpdateUserDto, UserResponseDto};
use crate::features::users::models::{Role, User};
use crate::shared::types::{PaginationQuery, SearchQuery};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, bio, role, is_superuser, confirmation_code";

const USERNAME_TAKEN: &str = "A user with that username or email already exists";

/// Item path of `/users/{username}`
#[derive(Debug, Deserialize)]
pub struct UsernameKey {
    pub username: String,
}

/// Fields for a new account row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl NewUser {
    /// Bare account created by the sign-up flow
    pub fn signup(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role: Role::User,
        }
    }
}

impl From<CreateUserDto> for NewUser {
    fn from(dto: CreateUserDto) -> Self {
        Self {
            username: dto.username,
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            bio: dto.bio,
            role: dto.role,
        }
    }
}

/// Service for account storage, admin user management and the caller's own profile
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load user {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user by username: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load user by email: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn get_by_username(&self, username: &str) -> Result<User> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))
    }

    pub async fn insert(&self, new_user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, bio, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.bio)
        .bind(new_user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, USERNAME_TAKEN))?;

        tracing::info!("User created: id={}, username={}", user.id, user.username);
        Ok(user)
    }

    /// Apply the fields present in `dto`; absent fields keep their value.
    async fn apply_update(&self, id: i64, dto: UpdateUserDto) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                bio = COALESCE($6, bio),
                role = COALESCE($7, role)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(dto.username)
        .bind(dto.email)
        .bind(dto.first_name)
        .bind(dto.last_name)
        .bind(dto.bio)
        .bind(dto.role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, USERNAME_TAKEN))?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Store the digest of a freshly issued confirmation code.
    pub async fn set_confirmation_code(&self, id: i64, digest: &str) -> Result<()> {
        sqlx::query("UPDATE users SET confirmation_code = $2 WHERE id = $1")
            .bind(id)
            .bind(digest)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store confirmation code for user {}: {:?}", id, e);
                AppError::Database(e)
            })?;
        Ok(())
    }

    /// Clear the confirmation code if it still equals `digest`.
    ///
    /// Returns `false` when another request consumed or replaced it first.
    pub async fn consume_confirmation_code(&self, id: i64, digest: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET confirmation_code = NULL WHERE id = $1 AND confirmation_code = $2",
        )
        .bind(id)
        .bind(digest)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to consume confirmation code for user {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() == 1)
    }

    /// Create the superuser account, or promote an existing one with that username.
    pub async fn ensure_superuser(&self, username: &str, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, role, is_superuser)
            VALUES ($1, $2, 'admin', TRUE)
            ON CONFLICT (username) DO UPDATE SET role = 'admin', is_superuser = TRUE
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Superuser email belongs to another account"))?;

        tracing::info!("Superuser ready: id={}, username={}", user.id, user.username);
        Ok(user)
    }

    /// Profile of the authenticated caller
    pub async fn get_profile(&self, user: &AuthenticatedUser) -> Result<UserResponseDto> {
        self.find_by_id(user.id)
            .await?
            .map(UserResponseDto::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Update the caller's own profile; `dto.role` must already be cleared.
    pub async fn update_profile(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateUserDto,
    ) -> Result<UserResponseDto> {
        let updated = self.apply_update(user.id, dto).await?;
        tracing::info!("Profile updated: id={}", updated.id);
        Ok(updated.into())
    }
}

#[async_trait]
impl Resource for UserService {
    type Scope = Unscoped;
    type Key = UsernameKey;
    type Filter = SearchQuery;
    type Create = CreateUserDto;
    type Update = UpdateUserDto;
    type Output = UserResponseDto;
    type Permission = IsAdmin;

    const NAME: &'static str = "User";
    const OPERATIONS: Operations = Operations::ALL;

    async fn list(
        &self,
        _scope: &Unscoped,
        filter: &SearchQuery,
        page: &PaginationQuery,
    ) -> Result<(Vec<UserResponseDto>, i64)> {
        let search = filter.term();

        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE ($1::text IS NULL OR username ILIKE '%' || $1 || '%')
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            USER_COLUMNS
        ))
        .bind(search)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR username ILIKE '%' || $1 || '%')",
        )
        .bind(search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count users: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    async fn retrieve(&self, key: &UsernameKey) -> Result<UserResponseDto> {
        Ok(self.get_by_username(&key.username).await?.into())
    }

    async fn create(
        &self,
        actor: &AuthenticatedUser,
        _scope: &Unscoped,
        input: CreateUserDto,
    ) -> Result<UserResponseDto> {
        let user = self.insert(input.into()).await?;
        tracing::info!("User {} created by admin {}", user.username, actor.username);
        Ok(user.into())
    }

    async fn update(&self, key: &UsernameKey, input: UpdateUserDto) -> Result<UserResponseDto> {
        let existing = self.get_by_username(&key.username).await?;
        Ok(self.apply_update(existing.id, input).await?.into())
    }

    async fn destroy(&self, key: &UsernameKey) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(&key.username)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User '{}' not found", key.username)));
        }

        tracing::info!("User deleted: username={}", key.username);
        Ok(())
    }
}
