//! Driven port for account persistence.

use async_trait::async_trait;

use crate::domain::{EmailAddress, NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } => "user already exists: {message}",
    }
}

/// Storage for [`User`] records.
///
/// Lookups return `Ok(None)` for unknown users; mutations addressed to a
/// missing user are no-ops.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &EmailAddress)
    -> Result<Option<User>, UserPersistenceError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new account with the default role, unconfirmed.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Store or clear the refresh token that marks an open session.
    async fn set_refresh_token(
        &self,
        id: &UserId,
        token: Option<String>,
    ) -> Result<(), UserPersistenceError>;

    async fn confirm_email(&self, email: &EmailAddress) -> Result<(), UserPersistenceError>;

    /// Replace the avatar URL, returning the updated record.
    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: &str,
    ) -> Result<Option<User>, UserPersistenceError>;

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError>;
}
