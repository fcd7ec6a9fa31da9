//! Authentication module: signup with email verification, signin issuing
//! signed session tokens, confirmation-token redemption.

pub mod handlers;
pub mod password;
pub mod service;
pub mod tokens;

pub use service::{AuthService, NewAccount, Session};
pub use tokens::{Claims, TokenIssuer};
