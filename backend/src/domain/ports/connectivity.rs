//! Driven port for backing-store liveness checks.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Raised when the backing store cannot answer a trivial query.
    pub enum ConnectivityError {
        Unavailable { message: String } => "database unavailable: {message}",
        Misconfigured { message: String } => "database misconfigured: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Run a round-trip query against the store.
    async fn check(&self) -> Result<(), ConnectivityError>;
}

/// Probe that always reports healthy.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConnectivityProbe;

#[async_trait]
impl ConnectivityProbe for FixtureConnectivityProbe {
    async fn check(&self) -> Result<(), ConnectivityError> {
        Ok(())
    }
}
