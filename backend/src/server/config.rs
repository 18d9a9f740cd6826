//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::web;
use contactbook::inbound::http::state::HttpState;
use mockable::{Clock, DefaultClock};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ServerConfig {
    /// Construct a server configuration around the shared HTTP state.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, http_state: HttpState) -> Self {
        Self {
            bind_addr,
            http_state: web::Data::new(http_state),
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replace the clock used to stamp the `Request-Time` header.
    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Production always stamps with the system clock")
    )]
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
