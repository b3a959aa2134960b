use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailConfig;

/// A contact-form submission, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactMessage {
    pub fn subject_line(&self) -> String {
        match &self.subject {
            Some(subject) if !subject.trim().is_empty() => {
                format!("Portfolio contact: {}", subject.trim())
            }
            _ => format!("Portfolio contact from {}", self.name),
        }
    }

    pub fn text_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\n\n{}",
            self.name, self.email, self.message
        )
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_contact(&self, message: &ContactMessage) -> anyhow::Result<()>;
}

/// Builds the mailer the configuration asks for.
pub fn from_config(config: &MailConfig) -> Box<dyn Mailer> {
    match &config.resend_api_key {
        Some(key) => Box::new(ResendMailer::new(
            key.clone(),
            config.contact_from.clone(),
            config.contact_to.clone(),
        )),
        None => {
            tracing::warn!("No mail provider configured; contact messages will only be logged");
            Box::new(LogMailer)
        }
    }
}

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Delivers through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
    to: String,
}

#[derive(Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: String,
    text: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String, to: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
            to,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_contact(&self, message: &ContactMessage) -> anyhow::Result<()> {
        let body = ResendEmail {
            from: &self.from,
            to: [&self.to],
            reply_to: &message.email,
            subject: message.subject_line(),
            text: message.text_body(),
        };

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Resend API failed: {}", response.status()));
        }

        tracing::info!("Contact message from {} delivered", message.email);
        Ok(())
    }
}

/// Development fallback: writes the message to the log instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_contact(&self, message: &ContactMessage) -> anyhow::Result<()> {
        tracing::info!(
            "Contact message (not delivered): subject={:?} from={} <{}>",
            message.subject_line(),
            message.name,
            message.email
        );
        Ok(())
    }
}
