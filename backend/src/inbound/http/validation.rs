//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure is a `400 invalid_request` whose details carry
//! the offending `field` (camelCase, as sent by clients) and a stable `code`.

use actix_web::web;
use serde_json::json;

use crate::domain::{
    ContactId, ContactValidationError, Error, Page, PageQuery, PageValidationError, PasswordError,
    UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidValue,
    InvalidLength,
    InvalidEmail,
    InvalidPhone,
    OutOfRange,
    MalformedBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidLength => "invalid_length",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidPhone => "invalid_phone",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::MalformedBody => "malformed_body",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const ID: FieldName = FieldName::new("id");
pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const USERNAME: FieldName = FieldName::new("username");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");
pub(crate) const NEW_PASSWORD: FieldName = FieldName::new("newPassword");
pub(crate) const LIMIT: FieldName = FieldName::new("limit");

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_contact_id(value: &str) -> Result<ContactId, Error> {
    ContactId::new(value).map_err(|_| invalid_uuid_error(ID, value))
}

pub(crate) fn user_field_error(field: FieldName, err: &UserValidationError) -> Error {
    let code = match err {
        UserValidationError::EmptyEmail | UserValidationError::InvalidEmail => {
            ErrorCode::InvalidEmail
        }
        UserValidationError::EmptyUsername
        | UserValidationError::UsernameTooShort { .. }
        | UserValidationError::UsernameTooLong { .. }
        | UserValidationError::EmailTooLong { .. } => ErrorCode::InvalidLength,
        _ => ErrorCode::InvalidValue,
    };
    ValidationError::new(field.as_str(), err.to_string()).with_code(code)
}

pub(crate) fn password_error(field: FieldName, err: &PasswordError) -> Error {
    match err {
        PasswordError::Length { .. } => {
            ValidationError::new(field.as_str(), err.to_string()).with_code(ErrorCode::InvalidLength)
        }
        PasswordError::Hashing(_) => Error::internal(err.to_string()),
    }
}

pub(crate) fn contact_field_error(field: FieldName, err: &ContactValidationError) -> Error {
    let code = match err {
        ContactValidationError::InvalidId => ErrorCode::InvalidUuid,
        ContactValidationError::EmptyName | ContactValidationError::NameLength { .. } => {
            ErrorCode::InvalidLength
        }
        ContactValidationError::InvalidPhone => ErrorCode::InvalidPhone,
        ContactValidationError::Email(UserValidationError::EmailTooLong { .. }) => {
            ErrorCode::InvalidLength
        }
        ContactValidationError::Email(_) => ErrorCode::InvalidEmail,
    };
    ValidationError::new(field.as_str(), err.to_string()).with_code(code)
}

pub(crate) fn parse_page(query: PageQuery) -> Result<Page, Error> {
    Page::try_from(query).map_err(|err: PageValidationError| {
        ValidationError::new(LIMIT.as_str(), err.to_string()).with_code(ErrorCode::OutOfRange)
    })
}

fn malformed(message: String) -> actix_web::Error {
    ValidationError::new("body", message)
        .with_code(ErrorCode::MalformedBody)
        .into()
}

/// JSON extractor config that reports malformed bodies in the error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| malformed(err.to_string()))
}

/// Form extractor config mirroring [`json_config`].
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| malformed(err.to_string()))
}

/// Query extractor config mirroring [`json_config`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| malformed(err.to_string()))
}
