//! Driven port for outbound account email.

use async_trait::async_trait;

use crate::domain::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Failures raised by mail adapters.
    pub enum MailerError {
        /// The message body could not be rendered.
        Template { message: String } => "email template failed: {message}",
        /// Sender or recipient could not be turned into a mailbox.
        Address { message: String } => "email address rejected: {message}",
        /// The transport refused or dropped the message.
        Transport { message: String } => "email transport failed: {message}",
    }
}

/// Which account email to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Verification,
    PasswordReset,
}

impl EmailKind {
    pub fn subject(self) -> &'static str {
        match self {
            Self::Verification => "Confirm your email",
            Self::PasswordReset => "Reset your password",
        }
    }
}

/// A tokenised link email addressed to one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub kind: EmailKind,
    pub recipient: EmailAddress,
    pub username: String,
    /// Public base URL the link in the body points at.
    pub base_url: String,
    pub token: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailerError>;
}

/// Mailer that accepts and discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailer;

#[async_trait]
impl Mailer for FixtureMailer {
    async fn send(&self, _message: EmailMessage) -> Result<(), MailerError> {
        Ok(())
    }
}
