//! Outbound notification boundary.
//!
//! The auth service only sees the `Notifier` trait. `HttpMailer` posts to
//! a mail-delivery API; `LogNotifier` is the fallback for local runs with
//! no mail endpoint configured.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::error::NotifierError;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError>;
}

/// Delivers mail through an HTTP mail API (JSON POST).
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    from_address: String,
}

impl HttpMailer {
    pub fn new(api_url: String, from_address: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            from_address,
        }
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        let res = self
            .client
            .post(&self.api_url)
            .json(&json!({
                "from": self.from_address,
                "to": to,
                "subject": subject,
                "body": body,
            }))
            .send()
            .await
            .map_err(|e| NotifierError::Request(e.to_string()))?;

        if !res.status().is_success() {
            return Err(NotifierError::Rejected(format!(
                "mail API returned {}",
                res.status()
            )));
        }

        Ok(())
    }
}

/// Logs instead of delivering. The message body is not logged because it
/// embeds the confirmation token.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifierError> {
        info!("Mail delivery disabled, dropping message to {} ({})", to, subject);
        Ok(())
    }
}
