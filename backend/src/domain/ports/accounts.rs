//! Driving port for account and session use-cases.
//!
//! Inbound adapters call this port to register users, open and close
//! sessions, and run the email-link flows without touching persistence.

use async_trait::async_trait;

use crate::domain::{
    EmailAddress, Error, LoginCredentials, NewAccount, PlainPassword, TokenPair, User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Register a new account and send the verification email.
    ///
    /// `base_url` is the public origin used to build the link in the email.
    async fn signup(&self, account: NewAccount, base_url: &str) -> Result<User, Error>;

    /// Exchange credentials for a token pair.
    async fn login(&self, credentials: &LoginCredentials) -> Result<TokenPair, Error>;

    /// Close the user's session.
    async fn logout(&self, user: &User) -> Result<(), Error>;

    /// Rotate the token pair using the stored refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error>;

    /// Resolve an access token to the user holding an open session.
    async fn authenticate(&self, access_token: &str) -> Result<User, Error>;

    /// Re-send the verification email.
    async fn request_email(
        &self,
        email: &EmailAddress,
        base_url: &str,
    ) -> Result<&'static str, Error>;

    /// Mark the account behind a verification token as confirmed.
    async fn confirm_email(&self, token: &str) -> Result<&'static str, Error>;

    async fn update_avatar(&self, user: &User, avatar_url: &str) -> Result<User, Error>;

    /// Send a password reset link.
    async fn forgot_password(
        &self,
        email: &EmailAddress,
        base_url: &str,
    ) -> Result<&'static str, Error>;

    async fn reset_password(
        &self,
        token: &str,
        password: PlainPassword,
    ) -> Result<&'static str, Error>;
}
