use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::config::{ConfigError, EmailConfig};

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

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

/// One outgoing email; at least one body must be set.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
}

impl EmailMessage {
    pub fn new(to: String, subject: String) -> Self {
        Self { to, subject, text_body: None, html_body: None }
    }

    pub fn with_text_body(mut self, body: String) -> Self {
        self.text_body = Some(body);
        self
    }

    pub fn with_html_body(mut self, body: String) -> Self {
        self.html_body = Some(body);
        self
    }
}

/// Outbound mail seam; the dispatch service only ever talks to this.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Pooled async SMTP transport.
pub struct SmtpEmailService {
    pub config: EmailConfig,
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        config.validate()?;

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;

        let tls = if config.use_tls {
            let params = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;
            if config.use_starttls {
                Tls::Required(params)
            } else {
                Tls::Wrapper(params)
            }
        } else {
            Tls::None
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .tls(tls)
            .timeout(Some(Duration::from_secs(config.connection_timeout_secs)));
        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            builder = builder.credentials(Credentials::new(config.smtp_username.clone(), config.smtp_password.clone()));
        }

        info!("SMTP email service initialized");
        Ok(Self { from, transport: builder.build(), config })
    }

    fn build_message(&self, message: EmailMessage) -> Result<Message, EmailError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;
        let builder = Message::builder().from(self.from.clone()).to(to).subject(message.subject);

        let built = match (message.text_body, message.html_body) {
            (Some(text), Some(html)) => builder.multipart(MultiPart::alternative_plain_html(text, html)),
            (Some(text), None) => builder.header(ContentType::TEXT_PLAIN).body(text),
            (None, Some(html)) => builder.singlepart(SinglePart::html(html)),
            (None, None) => return Err(EmailError::MessageError("No message body provided".to_string())),
        };
        built.map_err(|e| EmailError::MessageError(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpEmailService {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        validate_email_address(&message.to)?;
        let email = self.build_message(message)?;

        self.transport.send(email).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(format!("Failed to send email: {}", e))
        })?;
        debug!("Email sent");
        Ok(())
    }
}

/// Cheap shape check before handing an address to SMTP: exactly one `@` with text on both sides.
pub fn validate_email_address(email: &str) -> Result<(), EmailError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ if email.is_empty() => Err(EmailError::AddressError("Email address cannot be empty".to_string())),
        _ => Err(EmailError::AddressError("Invalid email format".to_string())),
    }
}
