use async_trait::async_trait;
use serde::Serialize;

use crate::error::MailError;

/// One outbound email, as accepted by the ad-hoc send endpoint and built
/// by the weekly digests
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Boundary to the mail provider. The server only ever hands over a fully
/// formed message; transport, retries and rate limits live on the other
/// side of this trait.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Mailer that POSTs messages to a transactional-mail HTTP API
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct SendPayload<'a> {
    from: &'a str,
    #[serde(flatten)]
    message: &'a EmailMessage,
}

impl HttpMailer {
    pub fn new(api_url: String, api_token: Option<String>, from: String) -> Self {
        if api_token.is_none() {
            log::warn!("MAIL_API_TOKEN is not set; email sends will be rejected");
        }
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_token,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let token = self.api_token.as_deref().ok_or(MailError::NotConfigured)?;

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(token)
            .json(&SendPayload {
                from: &self.from,
                message,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            log::info!("email sent to {}: {}", message.to, message.subject);
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
