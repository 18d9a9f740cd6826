//! Domain primitives, services and ports.
//!
//! Purpose: hold everything that does not depend on a transport or a store.
//! Inbound adapters call the driving ports in [`ports`]; the services here
//! implement them over the driven ports.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`User`], [`Contact`] and their validated field types.
//! - [`AccountsService`] and [`ContactsService`]: use-case implementations.
//! - [`TokenService`]: scoped JWT issuance and verification.

pub mod access;
pub mod accounts;
pub mod auth;
pub mod avatar;
pub mod contact;
pub mod contacts;
pub mod error;
pub mod page;
pub mod password;
pub mod ports;
pub mod tokens;
pub mod trace_id;
pub mod user;

pub use self::access::{RoleAccess, STAFF_ONLY};
pub use self::accounts::AccountsService;
pub use self::auth::{LoginCredentials, LoginValidationError, NewAccount};
pub use self::avatar::{AvatarError, gravatar_url, parse_avatar_url};
pub use self::contact::{
    Contact, ContactDraft, ContactId, ContactValidationError, PersonName, PhoneNumber,
    days_until_birthday, is_upcoming_birthday,
};
pub use self::contacts::ContactsService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::page::{Page, PageQuery, PageValidationError};
pub use self::password::{PasswordError, PlainPassword, hash_password, verify_password};
pub use self::tokens::{Claims, TokenError, TokenPair, TokenScope, TokenService, TokenTtls};
pub use self::trace_id::TraceId;
pub use self::user::{EmailAddress, NewUser, Role, User, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use contactbook::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
