//! In-memory `AccountStore` used by tests and local runs without a
//! database. Role catalog is seeded with the full set unless constructed
//! through [`MemoryStore::with_roles`].

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::models::{ConfirmationToken, Role, RoleName, User};
use crate::store::AccountStore;

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    roles: Mutex<Vec<Role>>,
    tokens: Mutex<Vec<ConfirmationToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_roles(&[RoleName::Admin, RoleName::Pm, RoleName::User])
    }

    /// Store with a partial role catalog, for exercising the
    /// misconfigured-catalog path.
    pub fn with_roles(names: &[RoleName]) -> Self {
        let roles = names
            .iter()
            .map(|name| Role {
                id: Uuid::new_v4(),
                name: *name,
            })
            .collect();
        Self {
            users: Mutex::new(Vec::new()),
            roles: Mutex::new(roles),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_email_ignore_case(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn save_user(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => {
                if users
                    .iter()
                    .any(|u| u.username == user.username || u.email == user.email)
                {
                    return Err(StoreError::Duplicate);
                }
                users.push(user.clone());
            }
        }
        Ok(user.clone())
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, StoreError> {
        let roles = self.roles.lock().unwrap();
        Ok(roles.iter().find(|r| r.name == name).cloned())
    }

    async fn save_confirmation_token(
        &self,
        token: &ConfirmationToken,
    ) -> Result<ConfirmationToken, StoreError> {
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.iter().any(|t| t.token == token.token) {
            return Err(StoreError::Duplicate);
        }
        tokens.push(token.clone());
        Ok(token.clone())
    }

    async fn find_confirmation_token(
        &self,
        token: &str,
    ) -> Result<Option<ConfirmationToken>, StoreError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.token == token).cloned())
    }
}
