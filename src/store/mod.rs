//! Account persistence boundary.
//!
//! The auth service only sees the `AccountStore` trait; the Postgres
//! implementation and the in-memory implementation used by tests both
//! live behind it.

pub mod models;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use models::{ConfirmationToken, Role, RoleName, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Case-insensitive variant used when redeeming a confirmation token.
    async fn find_by_email_ignore_case(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    /// Insert-or-update keyed on the user id.
    async fn save_user(&self, user: &User) -> Result<User, StoreError>;

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, StoreError>;

    async fn save_confirmation_token(
        &self,
        token: &ConfirmationToken,
    ) -> Result<ConfirmationToken, StoreError>;

    async fn find_confirmation_token(
        &self,
        token: &str,
    ) -> Result<Option<ConfirmationToken>, StoreError>;
}
