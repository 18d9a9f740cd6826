//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{Accounts, Contacts};

use super::rate_limit::RateLimiter;

/// Origin used in emailed links unless configured otherwise.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8000/";

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn Accounts>,
    pub contacts: Arc<dyn Contacts>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Public origin for links in outgoing email. Never derived from the
    /// request, whose `Host` header is client-controlled.
    pub public_base_url: Arc<str>,
}

impl HttpState {
    /// Construct state from the driving ports and the shared limiter.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use contactbook::domain::ports::{Accounts, Contacts};
    /// use contactbook::inbound::http::rate_limit::RateLimiter;
    /// use contactbook::inbound::http::state::HttpState;
    /// use mockable::DefaultClock;
    ///
    /// fn build(accounts: Arc<dyn Accounts>, contacts: Arc<dyn Contacts>) -> HttpState {
    ///     let limiter = Arc::new(RateLimiter::new(5, 60, Arc::new(DefaultClock)));
    ///     HttpState::new(accounts, contacts, limiter)
    /// }
    /// ```
    pub fn new(
        accounts: Arc<dyn Accounts>,
        contacts: Arc<dyn Contacts>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            accounts,
            contacts,
            rate_limiter,
            public_base_url: Arc::from(DEFAULT_PUBLIC_BASE_URL),
        }
    }

    /// Replace the origin used to build emailed links.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<Arc<str>>) -> Self {
        self.public_base_url = url.into();
        self
    }
}
