use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed role catalog. Roles are reference data: looked up by name at
/// signup, never created or modified by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleName {
    Admin,
    Pm,
    User,
}

impl RoleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "ROLE_ADMIN",
            RoleName::Pm => "ROLE_PM",
            RoleName::User => "ROLE_USER",
        }
    }

    pub fn from_db_name(name: &str) -> Option<Self> {
        match name {
            "ROLE_ADMIN" => Some(RoleName::Admin),
            "ROLE_PM" => Some(RoleName::Pm),
            "ROLE_USER" => Some(RoleName::User),
            _ => None,
        }
    }

    /// Maps a requested role string from a signup call to a catalog name.
    /// Unrecognized strings fall back to the plain user role rather than
    /// failing the request.
    pub fn resolve(requested: &str) -> Self {
        match requested {
            "admin" => RoleName::Admin,
            "pm" => RoleName::Pm,
            _ => RoleName::User,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: RoleName,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<RoleName>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The verified flag is taken from the caller as-is; signup does not
    /// force it to false.
    pub fn new(
        name: String,
        username: String,
        email: String,
        password_hash: String,
        verified: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            username,
            email,
            password_hash,
            roles: Vec::new(),
            verified,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Links a freshly registered user to the opaque token mailed out for
/// email verification. The user's email is captured at creation and is
/// the lookup key used when the token is redeemed. Tokens do not expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl ConfirmationToken {
    pub fn new(user: &User, token: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            user_id: user.id,
            user_email: user.email.clone(),
            created_at: Utc::now(),
        }
    }
}
