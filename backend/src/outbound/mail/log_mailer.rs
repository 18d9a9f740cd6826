//! Mailer used when no SMTP relay is configured.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{EmailMessage, Mailer, MailerError};

use super::templates::link_for;

/// Logs the link each email would contain instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailerError> {
        info!(
            recipient = %message.recipient,
            kind = ?message.kind,
            link = %link_for(&message),
            "smtp not configured; email not sent"
        );
        Ok(())
    }
}
