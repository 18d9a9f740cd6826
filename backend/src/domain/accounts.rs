//! Account and session service.
//!
//! Implements the [`Accounts`] driving port on top of a [`UserRepository`],
//! a [`Mailer`] and the [`TokenService`]. Email delivery failures are
//! logged and never fail the calling request.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{
    Accounts, EmailKind, EmailMessage, Mailer, UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, Error, LoginCredentials, NewAccount, NewUser, PlainPassword, TokenError,
    TokenPair, TokenScope, TokenService, User, gravatar_url, hash_password, parse_avatar_url,
    verify_password,
};

pub const ALREADY_CONFIRMED: &str = "Your email is already confirmed";
pub const CHECK_EMAIL: &str = "Check your email for confirmation.";
pub const EMAIL_CONFIRMED: &str = "Email confirmed";
pub const PASSWORD_RESET: &str = "Password reset successfully";

const BAD_CREDENTIALS: &str = "Could not validate credentials";

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Conflict { .. } => Error::conflict("Account already exists"),
    }
}

fn credentials_error() -> Error {
    Error::unauthorized(BAD_CREDENTIALS)
}

fn email_token_error() -> Error {
    Error::unprocessable("Invalid token for email verification")
}

fn token_issue_error(error: TokenError) -> Error {
    Error::internal(format!("token issuance failed: {error}"))
}

/// Account service backed by a user repository.
#[derive(Clone)]
pub struct AccountsService<U> {
    users: Arc<U>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenService,
}

impl<U> AccountsService<U> {
    pub fn new(users: Arc<U>, mailer: Arc<dyn Mailer>, tokens: TokenService) -> Self {
        Self {
            users,
            mailer,
            tokens,
        }
    }
}

impl<U: UserRepository> AccountsService<U> {
    async fn find_user(&self, email: &EmailAddress) -> Result<Option<User>, Error> {
        self.users.find_by_email(email).await.map_err(map_user_error)
    }

    async fn store_refresh_token(&self, user: &User, token: Option<String>) -> Result<(), Error> {
        self.users
            .set_refresh_token(&user.id, token)
            .await
            .map_err(map_user_error)
    }

    async fn open_session(&self, user: &User) -> Result<TokenPair, Error> {
        let pair = self
            .tokens
            .issue_pair(&user.email)
            .map_err(token_issue_error)?;
        self.store_refresh_token(user, Some(pair.refresh_token.clone()))
            .await?;
        Ok(pair)
    }

    /// Resolve an email-link token to its account.
    fn email_from_token(&self, token: &str, scope: TokenScope) -> Result<EmailAddress, Error> {
        let claims = self
            .tokens
            .decode(token, scope)
            .map_err(|_| email_token_error())?;
        EmailAddress::new(claims.sub).map_err(|_| email_token_error())
    }

    async fn send_link(&self, kind: EmailKind, user: &User, base_url: &str) {
        let token = match kind {
            EmailKind::Verification => self.tokens.issue_email_verification(&user.email),
            EmailKind::PasswordReset => self.tokens.issue_password_reset(&user.email),
        };
        let token = match token {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, user_id = %user.id, "could not mint email token");
                return;
            }
        };
        let message = EmailMessage {
            kind,
            recipient: user.email.clone(),
            username: user.username.to_string(),
            base_url: base_url.to_owned(),
            token,
        };
        if let Err(error) = self.mailer.send(message).await {
            warn!(%error, user_id = %user.id, ?kind, "account email was not sent");
        }
    }
}

#[async_trait]
impl<U: UserRepository> Accounts for AccountsService<U> {
    async fn signup(&self, account: NewAccount, base_url: &str) -> Result<User, Error> {
        if self.find_user(&account.email).await?.is_some() {
            return Err(Error::conflict("Account already exists"));
        }
        let password_hash = hash_password(&account.password)
            .map_err(|err| Error::internal(err.to_string()))?;
        let new_user = NewUser {
            avatar: Some(gravatar_url(&account.email)),
            username: account.username,
            email: account.email,
            password_hash,
        };
        let user = self.users.create(&new_user).await.map_err(map_user_error)?;
        self.send_link(EmailKind::Verification, &user, base_url)
            .await;
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<TokenPair, Error> {
        let invalid_email = || Error::unauthorized("Invalid email");
        let email = EmailAddress::new(credentials.username()).map_err(|_| invalid_email())?;
        let user = self.find_user(&email).await?.ok_or_else(invalid_email)?;
        if !user.confirmed {
            return Err(Error::unauthorized("Email not confirmed"));
        }
        if !verify_password(credentials.password(), &user.password_hash) {
            return Err(Error::unauthorized("Invalid password"));
        }
        self.open_session(&user).await
    }

    async fn logout(&self, user: &User) -> Result<(), Error> {
        self.store_refresh_token(user, None).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error> {
        let claims = self
            .tokens
            .decode_refresh(refresh_token)
            .map_err(|err| match err {
                TokenError::WrongScope { .. } => Error::unauthorized("Invalid scope for token"),
                _ => credentials_error(),
            })?;
        let email = EmailAddress::new(claims.sub).map_err(|_| credentials_error())?;
        let user = self
            .find_user(&email)
            .await?
            .ok_or_else(credentials_error)?;
        if user.refresh_token.as_deref() != Some(refresh_token) {
            // Presenting a rotated token ends the session.
            self.store_refresh_token(&user, None).await?;
            return Err(Error::unauthorized("Invalid refresh token"));
        }
        self.open_session(&user).await
    }

    async fn authenticate(&self, access_token: &str) -> Result<User, Error> {
        let claims = self
            .tokens
            .decode_access(access_token)
            .map_err(|_| credentials_error())?;
        let email = EmailAddress::new(claims.sub).map_err(|_| credentials_error())?;
        match self.find_user(&email).await? {
            Some(user) if user.has_session() => Ok(user),
            _ => Err(credentials_error()),
        }
    }

    async fn request_email(
        &self,
        email: &EmailAddress,
        base_url: &str,
    ) -> Result<&'static str, Error> {
        if let Some(user) = self.find_user(email).await? {
            if user.confirmed {
                return Ok(ALREADY_CONFIRMED);
            }
            self.send_link(EmailKind::Verification, &user, base_url)
                .await;
        }
        Ok(CHECK_EMAIL)
    }

    async fn confirm_email(&self, token: &str) -> Result<&'static str, Error> {
        let email = self.email_from_token(token, TokenScope::EmailVerification)?;
        let user = self
            .find_user(&email)
            .await?
            .ok_or_else(|| Error::invalid_request("Verification error"))?;
        if user.confirmed {
            return Ok(ALREADY_CONFIRMED);
        }
        self.users
            .confirm_email(&email)
            .await
            .map_err(map_user_error)?;
        Ok(EMAIL_CONFIRMED)
    }

    async fn update_avatar(&self, user: &User, avatar_url: &str) -> Result<User, Error> {
        let url = parse_avatar_url(avatar_url).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "avatarUrl",
                "code": err.code(),
            }))
        })?;
        self.users
            .set_avatar(&user.id, url.as_str())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    async fn forgot_password(
        &self,
        email: &EmailAddress,
        base_url: &str,
    ) -> Result<&'static str, Error> {
        let user = self
            .find_user(email)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))?;
        self.send_link(EmailKind::PasswordReset, &user, base_url)
            .await;
        Ok(CHECK_EMAIL)
    }

    async fn reset_password(
        &self,
        token: &str,
        password: PlainPassword,
    ) -> Result<&'static str, Error> {
        let email = self.email_from_token(token, TokenScope::PasswordReset)?;
        let user = self
            .find_user(&email)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))?;
        let password_hash =
            hash_password(&password).map_err(|err| Error::internal(err.to_string()))?;
        self.users
            .set_password_hash(&user.id, &password_hash)
            .await
            .map_err(map_user_error)?;
        Ok(PASSWORD_RESET)
    }
}
