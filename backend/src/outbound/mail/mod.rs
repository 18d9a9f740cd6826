//! Outbound email adapters.
//!
//! - [`SmtpMailer`] renders askama templates and relays them over SMTP.
//! - [`SpawningMailer`] moves delivery onto a background task.
//! - [`LogMailer`] stands in when SMTP is not configured.

mod log_mailer;
mod smtp;
mod spawning;
mod templates;

pub use log_mailer::LogMailer;
pub use smtp::{SmtpConfig, SmtpMailer};
pub use spawning::SpawningMailer;
