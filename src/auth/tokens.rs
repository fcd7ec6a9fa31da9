//! Token issuance: opaque confirmation tokens and signed session JWTs.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::models::RoleName;

/// 32 random bytes, base64url-encoded: 256 bits of entropy per token.
const CONFIRMATION_TOKEN_BYTES: usize = 32;

/// Claims embedded in a session token. The token is the complete proof of
/// authentication; nothing is kept server-side.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    jwt_secret: String,
    token_expiry_hours: i64,
}

impl TokenIssuer {
    pub fn new(jwt_secret: String, token_expiry_hours: i64) -> Self {
        Self {
            jwt_secret,
            token_expiry_hours,
        }
    }

    /// Generates an opaque, URL-safe confirmation token. Not derived from
    /// any user data; no expiry is attached.
    pub fn issue_confirmation_token(&self) -> String {
        let mut bytes = [0u8; CONFIRMATION_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Signs a session token binding the username and roles with a fixed
    /// expiry window.
    pub fn issue_session_token(
        &self,
        username: &str,
        roles: &[RoleName],
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::hours(self.token_expiry_hours)).timestamp();
        let claims = Claims {
            sub: username.to_string(),
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
            iat: now.timestamp(),
            exp,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    pub fn decode_session_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(data.claims)
    }
}
