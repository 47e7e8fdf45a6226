use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Mutex;
use tracing::{error, info, instrument};

use crate::config::EmailConfig;
use crate::util::html::escape;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("SMTP error: {0}")]
    SmtpError(String),
    #[error("Message building error: {0}")]
    MessageError(String),
    #[error("Address error: {0}")]
    AddressError(String),
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl EmailMessage {
    pub fn verification(to: &str, user_name: &str, verify_url: &str) -> Self {
        EmailMessage {
            to: to.to_string(),
            subject: "Verify your email - Kabale Market".to_string(),
            text_body: format!(
                "Hello {user_name},\n\nWelcome to Kabale Market. Confirm your email address by opening this link:\n\n{verify_url}\n\nThe link expires in 24 hours.\n"
            ),
            html_body: format!(
                "<p>Hello {name},</p><p>Welcome to Kabale Market. Confirm your email address:</p>\
                 <p><a href=\"{url}\">Verify email</a></p><p>The link expires in 24 hours.</p>",
                name = escape(user_name),
                url = escape(verify_url)
            ),
        }
    }

    pub fn password_reset(to: &str, user_name: &str, reset_url: &str) -> Self {
        EmailMessage {
            to: to.to_string(),
            subject: "Password reset - Kabale Market".to_string(),
            text_body: format!(
                "Hello {user_name},\n\nWe received a request to reset your Kabale Market password. Open this link to choose a new one:\n\n{reset_url}\n\nThe link expires in 1 hour. If you did not ask for this, ignore this email.\n"
            ),
            html_body: format!(
                "<p>Hello {name},</p><p>We received a request to reset your Kabale Market password.</p>\
                 <p><a href=\"{url}\">Reset password</a></p>\
                 <p>The link expires in 1 hour. If you did not ask for this, ignore this email.</p>",
                name = escape(user_name),
                url = escape(reset_url)
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

pub struct SmtpMailer {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        config
            .validate()
            .map_err(|e| EmailError::ConfigError(e.to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        if config.use_tls {
            let tls_parameters = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;
            builder = if config.use_starttls {
                builder.tls(Tls::Required(tls_parameters))
            } else {
                builder.tls(Tls::Wrapper(tls_parameters))
            };
        } else {
            builder = builder.tls(Tls::None);
        }

        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        info!("SMTP mailer initialized");
        Ok(SmtpMailer {
            transport: builder.build(),
            config,
        })
    }

    fn build_message(&self, message: EmailMessage) -> Result<Message, EmailError> {
        let from: Mailbox = self
            .config
            .from_mailbox()
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(message.text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(message.html_body),
                    ),
            )
            .map_err(|e| EmailError::MessageError(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let email = self.build_message(message)?;
        self.transport.send(email).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(format!("Failed to send email: {}", e))
        })?;
        info!("Email sent");
        Ok(())
    }
}

/// Logs mail instead of sending it and keeps a copy for inspection.
#[derive(Default)]
pub struct LogMailer {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl LogMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(to = %message.to, subject = %message.subject, body = %message.text_body, "Mail not sent (log mailer)");
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_mail_escapes_name() {
        let message = EmailMessage::password_reset("a@b.c", "<b>Eve</b>", "http://x/reset?token=t");
        assert!(message.html_body.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(message.text_body.contains("http://x/reset?token=t"));
    }

    #[tokio::test]
    async fn log_mailer_keeps_outbox() {
        let mailer = LogMailer::default();
        mailer
            .send(EmailMessage::verification("a@b.c", "Ann", "http://x/verify?token=t"))
            .await
            .unwrap();
        assert_eq!(mailer.sent().len(), 1);
    }
}
