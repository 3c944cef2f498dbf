//! Outbound email over SMTP.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::integrations::{IntegrationError, IntegrationResult, REQUEST_TIMEOUT};
use crate::models::config::SmtpConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> IntegrationResult<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> IntegrationResult<Self> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|err| IntegrationError::Smtp(err.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port).timeout(Some(REQUEST_TIMEOUT));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|err| IntegrationError::Smtp(format!("invalid sender address: {err}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

pub fn build_message(from: &Mailbox, email: &OutgoingEmail) -> IntegrationResult<Message> {
    let to = Mailbox::new(
        Some(email.to_name.clone()),
        email
            .to_email
            .parse()
            .map_err(|err| IntegrationError::Smtp(format!("invalid recipient: {err}")))?,
    );

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ))
        .map_err(|err| IntegrationError::Smtp(err.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> IntegrationResult<()> {
        let message = build_message(&self.from, email)?;
        log::debug!("Sending \"{}\" to {}", email.subject, email.to_email);
        self.transport
            .send(message)
            .await
            .map_err(|err| IntegrationError::Smtp(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to_email: to.to_string(),
            to_name: "Ann Lee".to_string(),
            subject: "Hello".to_string(),
            text_body: "Hi Ann".to_string(),
            html_body: "<p>Hi Ann</p>".to_string(),
        }
    }

    #[test]
    fn builds_alternative_message() {
        let from: Mailbox = "Sales <sales@example.com>".parse().unwrap();
        let message = build_message(&from, &email("ann@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Hello"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn rejects_invalid_recipient() {
        let from: Mailbox = "Sales <sales@example.com>".parse().unwrap();
        assert!(matches!(
            build_message(&from, &email("not an email")),
            Err(IntegrationError::Smtp(_))
        ));
    }
}
