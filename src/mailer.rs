use anyhow::Context;
use axum::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

/// Outbound email seam. Failures are opaque to callers and are not retried.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str, html: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("smtp transport")?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from: Mailbox = config.from.parse().context("parse SMTP_FROM")?;
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

/// Multipart/alternative message with a plain-text and an HTML rendering.
fn build_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    text: &str,
    html: &str,
) -> anyhow::Result<Message> {
    let to: Mailbox = to.parse().context("parse recipient address")?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.to_string()),
                ),
        )
        .context("build email")
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, text: &str, html: &str) -> anyhow::Result<()> {
        let message = build_message(&self.from, to, subject, text, html)?;
        self.transport.send(message).await.context("smtp send")?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use doubles::{FailingMailer, RecordingMailer, SentEmail};


#[cfg(test)]
mod tests {
    use super::*;

    fn from_mailbox() -> Mailbox {
        "no-reply@otpgate.local".parse().unwrap()
    }

    #[test]
    fn build_message_accepts_valid_recipient() {
        let msg = build_message(
            &from_mailbox(),
            "alice@example.com",
            "Your OTP Code - Secure Login",
            "Your OTP is: 123456",
            "<p>Your OTP is: <strong>123456</strong></p>",
        );
        assert!(msg.is_ok());
    }

    #[test]
    fn build_message_rejects_malformed_recipient() {
        let msg = build_message(
            &from_mailbox(),
            "not an address",
            "subject",
            "text",
            "<p>html</p>",
        );
        assert!(msg.is_err());
    }
}
