//! Fire-and-forget wrapper that delivers mail off the request path.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::TraceId;
use crate::domain::ports::{EmailMessage, Mailer, MailerError};

/// Hands each message to a spawned task so responses never wait on SMTP.
///
/// The caller's trace identifier is carried into the task so delivery
/// failures can be correlated with the request that caused them.
#[derive(Clone)]
pub struct SpawningMailer {
    inner: Arc<dyn Mailer>,
}

impl SpawningMailer {
    pub fn new(inner: Arc<dyn Mailer>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Mailer for SpawningMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailerError> {
        let inner = Arc::clone(&self.inner);
        let trace_id = TraceId::current().unwrap_or_else(TraceId::generate);
        let kind = message.kind;
        tokio::spawn(TraceId::scope(trace_id, async move {
            if let Err(err) = inner.send(message).await {
                warn!(%trace_id, ?kind, error = %err, "background email delivery failed");
            }
        }));
        Ok(())
    }
}
