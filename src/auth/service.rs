//! Auth service orchestration: signup, signin, confirm-account.
//!
//! Stateless between requests; all durable state lives behind the
//! `AccountStore` trait, outbound mail behind `Notifier`.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::password;
use crate::auth::tokens::TokenIssuer;
use crate::error::{AppError, AuthError};
use crate::notify::Notifier;
use crate::store::models::{ConfirmationToken, RoleName, User};
use crate::store::AccountStore;

const MAIL_SUBJECT: &str = "Complete Registration!";

/// Signup input, already validated at the transport layer.
#[derive(Debug)]
pub struct NewAccount {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub verified: bool,
    pub roles: Vec<String>,
}

/// Proof of authentication returned from signin. Nothing is stored
/// server-side; the token is the whole session.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub username: String,
}

pub struct AuthService {
    store: Arc<dyn AccountStore>,
    notifier: Arc<dyn Notifier>,
    tokens: TokenIssuer,
    confirmation_base_url: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        tokens: TokenIssuer,
        confirmation_base_url: String,
    ) -> Self {
        Self {
            store,
            notifier,
            tokens,
            confirmation_base_url,
        }
    }

    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Registers an account and mails out a confirmation link.
    ///
    /// The user and confirmation token stay persisted even when mail
    /// delivery fails; the failure is surfaced to the caller and the
    /// client is expected to re-request delivery out of band.
    pub async fn signup(&self, account: NewAccount) -> Result<(), AppError> {
        if self.store.exists_by_username(&account.username).await? {
            return Err(AuthError::DuplicateUsername.into());
        }
        if self.store.exists_by_email(&account.email).await? {
            return Err(AuthError::DuplicateEmail.into());
        }

        let password_hash = password::hash(&account.password)?;

        let mut roles: Vec<RoleName> = Vec::new();
        for requested in &account.roles {
            let name = RoleName::resolve(requested);
            let role = self
                .store
                .find_role_by_name(name)
                .await?
                .ok_or(AuthError::RoleNotConfigured(name))?;
            if !roles.contains(&role.name) {
                roles.push(role.name);
            }
        }

        // The verified flag is persisted exactly as the caller supplied it.
        let mut user = User::new(
            account.name,
            account.username,
            account.email,
            password_hash,
            account.verified,
        );
        user.roles = roles;
        let user = self.store.save_user(&user).await?;

        let token = ConfirmationToken::new(&user, self.tokens.issue_confirmation_token());
        self.store.save_confirmation_token(&token).await?;

        info!(username = %user.username, "Account registered, sending confirmation mail");

        let body = format!(
            "To confirm your account, please click here : {}/api/auth/confirm-account/{}",
            self.confirmation_base_url, token.token
        );
        if let Err(e) = self.notifier.send(&user.email, MAIL_SUBJECT, &body).await {
            warn!(username = %user.username, error = %e, "Confirmation mail delivery failed");
            return Err(e.into());
        }

        Ok(())
    }

    /// Authenticates a verified account and issues a signed session token.
    pub async fn signin(&self, username: &str, pass: &str) -> Result<Session, AppError> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(username.to_string()))?;

        // Unverified accounts are rejected before any credential check.
        if !user.verified {
            return Err(AuthError::NotVerified.into());
        }

        if !password::verify(pass, &user.password_hash)? {
            return Err(AuthError::BadCredentials.into());
        }

        let token = self.tokens.issue_session_token(&user.username, &user.roles)?;

        info!(username = %user.username, "Signin successful");

        Ok(Session {
            token,
            username: user.username,
        })
    }

    /// Redeems a confirmation token, flipping the linked user to verified.
    ///
    /// The user is resolved through the email captured on the token record
    /// (case-insensitively), not through its foreign key. Redemption is
    /// repeatable: confirming an already-verified account succeeds again.
    pub async fn confirm_account(&self, token: &str) -> Result<(), AppError> {
        let confirmation = self
            .store
            .find_confirmation_token(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        // Token found but the referenced user is gone: a data-integrity
        // fault, reported rather than swallowed.
        let mut user = self
            .store
            .find_by_email_ignore_case(&confirmation.user_email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(confirmation.user_email.clone()))?;

        user.verified = true;
        self.store.save_user(&user).await?;

        info!(username = %user.username, "Account verified");

        Ok(())
    }
}
