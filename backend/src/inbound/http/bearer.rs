//! Bearer-token extractors.
//!
//! [`BearerToken`] pulls the raw token from `Authorization: Bearer ...`.
//! [`CurrentUser`] additionally resolves it through the accounts port, so a
//! handler taking `CurrentUser` only runs for a live session.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::{Error, User};

use super::state::HttpState;

const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Raw bearer credential taken from the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn from_header(req: &HttpRequest) -> Result<Self, Error> {
        let value = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::unauthorized(NOT_AUTHENTICATED))?;
        let (scheme, token) = value
            .split_once(' ')
            .ok_or_else(|| Error::unauthorized(NOT_AUTHENTICATED))?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(Error::unauthorized(NOT_AUTHENTICATED));
        }
        Ok(Self(token.to_owned()))
    }
}

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_header(req))
    }
}

/// The authenticated account behind the request's access token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = BearerToken::from_header(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let user = state.accounts.authenticate(token.as_str()).await?;
            Ok(CurrentUser(user))
        })
    }
}
