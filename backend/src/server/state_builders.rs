//! Builders for the mailer and the service ports behind [`HttpState`].

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use contactbook::domain::ports::{ContactRepository, Mailer, MailerError, UserRepository};
use contactbook::domain::{AccountsService, ContactsService, TokenError, TokenService};
use contactbook::inbound::http::rate_limit::RateLimiter;
use contactbook::inbound::http::state::HttpState;
use contactbook::outbound::mail::{LogMailer, SmtpConfig, SmtpMailer, SpawningMailer};
use contactbook::outbound::persistence::{DbPool, DieselContactRepository, DieselUserRepository};
use contactbook::settings::{Settings, SettingsError};

/// Failures while assembling application state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("token service: {0}")]
    Tokens(#[from] TokenError),
    #[error("mailer: {0}")]
    Mailer(#[from] MailerError),
}

/// Choose the outbound mailer.
///
/// With an SMTP relay configured, mail is delivered in the background so
/// request handlers never wait on the relay. Otherwise links are only logged.
pub(super) fn build_mailer(smtp: Option<SmtpConfig>) -> Result<Arc<dyn Mailer>, MailerError> {
    build_mailer_with(smtp, SmtpMailer::new)
}

fn build_mailer_with<M, F>(smtp: Option<SmtpConfig>, make: F) -> Result<Arc<dyn Mailer>, MailerError>
where
    M: Mailer + 'static,
    F: FnOnce(&SmtpConfig) -> Result<M, MailerError>,
{
    match smtp {
        Some(config) => {
            info!(server = %config.server, port = config.port, "delivering mail through smtp relay");
            let relay: Arc<dyn Mailer> = Arc::new(make(&config)?);
            Ok(Arc::new(SpawningMailer::new(relay)))
        }
        None => {
            warn!("mail_server not set; emails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Build the shared HTTP state from repositories and settings.
pub(super) fn build_http_state<U, C>(
    settings: &Settings,
    users: Arc<U>,
    contacts: Arc<C>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, StartupError>
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
{
    let secret = settings.jwt_secret()?;
    let tokens = TokenService::new(
        secret.as_bytes(),
        settings.jwt_algorithm()?,
        settings.token_ttls()?,
        clock.clone(),
    )?;
    let (max_requests, window_secs) = settings.rate_limit();
    let public_base_url = settings.public_base_url()?;
    info!(%public_base_url, "emailed links use configured origin");

    Ok(HttpState::new(
        Arc::new(AccountsService::new(users, mailer, tokens)),
        Arc::new(ContactsService::new(contacts, clock.clone())),
        Arc::new(RateLimiter::new(max_requests, window_secs, clock)),
    )
    .with_public_base_url(public_base_url))
}

/// Build the shared HTTP state over the Diesel repositories.
pub(crate) fn build_diesel_http_state(
    settings: &Settings,
    pool: &DbPool,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, StartupError> {
    let mailer = build_mailer(settings.smtp())?;
    build_http_state(
        settings,
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselContactRepository::new(pool.clone())),
        mailer,
        clock,
    )
}
