//! SMTP mailer backed by `lettre`'s async Tokio transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{EmailMessage, Mailer, MailerError};

use super::templates::render;

/// Connection settings for an SMTP relay.
#[derive(Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: Zeroizing<String>,
    pub from: String,
    pub from_name: Option<String>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("from_name", &self.from_name)
            .finish()
    }
}

/// Sends rendered account emails through an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the relay transport. Port 465 uses implicit TLS.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let from = sender(config)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
            .map_err(|err| MailerError::transport(err.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.as_str().to_owned(),
            ))
            .build();
        Ok(Self { transport, from })
    }
}

fn sender(config: &SmtpConfig) -> Result<Mailbox, MailerError> {
    let address: Address = config
        .from
        .parse()
        .map_err(|err: lettre::address::AddressError| MailerError::address(err.to_string()))?;
    Ok(Mailbox::new(config.from_name.clone(), address))
}

/// Assemble the MIME message for `message` from `from`.
pub(crate) fn build_message(from: &Mailbox, message: &EmailMessage) -> Result<Message, MailerError> {
    let address: Address = message
        .recipient
        .as_ref()
        .parse()
        .map_err(|err: lettre::address::AddressError| MailerError::address(err.to_string()))?;
    let body = render(message)?;
    Message::builder()
        .from(from.clone())
        .to(Mailbox::new(Some(message.username.clone()), address))
        .subject(message.kind.subject())
        .header(ContentType::TEXT_HTML)
        .body(body)
        .map_err(|err| MailerError::template(err.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailerError> {
        let email = build_message(&self.from, &message)?;
        let response = self
            .transport
            .send(email)
            .await
            .map_err(|err| MailerError::transport(err.to_string()))?;
        debug!(code = %response.code(), kind = ?message.kind, "email accepted by relay");
        Ok(())
    }
}
