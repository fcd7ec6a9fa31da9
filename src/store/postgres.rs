//! Postgres-backed `AccountStore` built on sqlx.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::models::{ConfirmationToken, Role, RoleName, User};
use crate::store::AccountStore;

pub struct PgStore {
    pool: Arc<PgPool>,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    username: String,
    email: String,
    password_hash: String,
    roles: Vec<String>,
    verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, StoreError> {
        let roles = self
            .roles
            .iter()
            .map(|name| {
                RoleName::from_db_name(name)
                    .ok_or_else(|| StoreError::QueryError(format!("unknown role in row: {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(User {
            id: self.id,
            name: self.name,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            roles,
            verified: self.verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
}

#[derive(Debug, FromRow)]
struct TokenRow {
    id: Uuid,
    token: String,
    user_id: Uuid,
    user_email: String,
    created_at: DateTime<Utc>,
}

const SELECT_USER: &str =
    "SELECT id, name, username, email, password_hash, roles, verified, created_at, updated_at \
     FROM users";

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn fetch_user(&self, where_clause: &str, value: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE {where_clause}"))
            .bind(value)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.map(UserRow::into_user).transpose()
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user("username = $1", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user("email = $1", email).await
    }

    async fn find_by_email_ignore_case(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user("lower(email) = lower($1)", email).await
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(self.pool.as_ref())
                .await?;
        Ok(exists)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(exists)
    }

    async fn save_user(&self, user: &User) -> Result<User, StoreError> {
        let roles: Vec<String> = user.roles.iter().map(|r| r.as_str().to_string()).collect();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, username, email, password_hash, roles, verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    email = EXCLUDED.email,
                    password_hash = EXCLUDED.password_hash,
                    roles = EXCLUDED.roles,
                    verified = EXCLUDED.verified,
                    updated_at = now()
            RETURNING id, name, username, email, password_hash, roles, verified, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&roles)
        .bind(user.verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.into_user()
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, StoreError> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;

        match row {
            Some(row) => {
                let name = RoleName::from_db_name(&row.name).ok_or_else(|| {
                    StoreError::QueryError(format!("unknown role in catalog: {}", row.name))
                })?;
                Ok(Some(Role { id: row.id, name }))
            }
            None => Ok(None),
        }
    }

    async fn save_confirmation_token(
        &self,
        token: &ConfirmationToken,
    ) -> Result<ConfirmationToken, StoreError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            INSERT INTO confirmation_tokens (id, token, user_id, user_email, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, token, user_id, user_email, created_at
            "#,
        )
        .bind(token.id)
        .bind(&token.token)
        .bind(token.user_id)
        .bind(&token.user_email)
        .bind(token.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(ConfirmationToken {
            id: row.id,
            token: row.token,
            user_id: row.user_id,
            user_email: row.user_email,
            created_at: row.created_at,
        })
    }

    async fn find_confirmation_token(
        &self,
        token: &str,
    ) -> Result<Option<ConfirmationToken>, StoreError> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT id, token, user_id, user_email, created_at \
             FROM confirmation_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|row| ConfirmationToken {
            id: row.id,
            token: row.token,
            user_id: row.user_id,
            user_email: row.user_email,
            created_at: row.created_at,
        }))
    }
}
