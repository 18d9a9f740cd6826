//! Contact records owned by users.
//!
//! A contact belongs to exactly one owner. Services scope every read and
//! write by owner so one user never sees another user's address book.

use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{EmailAddress, UserId, UserValidationError};

/// Birthdays this many days ahead or fewer count as upcoming.
pub const UPCOMING_BIRTHDAY_DAYS: i64 = 7;

/// Minimum length shared by first and last names.
pub const NAME_MIN: usize = 3;
/// Maximum first name length.
pub const FIRST_NAME_MAX: usize = 50;
/// Maximum last name length.
pub const LAST_NAME_MAX: usize = 60;

/// Validation errors raised while building contact values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    #[error("contact id must be a valid UUID")]
    InvalidId,
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("phone number must match +380XXXXXXXXX")]
    InvalidPhone,
    #[error(transparent)]
    Email(#[from] UserValidationError),
}

/// Stable contact identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct ContactId(Uuid);

impl ContactId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ContactValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ContactId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First or last name of a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a first name (3..=50 characters).
    pub fn first(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        Self::bounded(raw.as_ref(), FIRST_NAME_MAX)
    }

    /// Validate a last name (3..=60 characters).
    pub fn last(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        Self::bounded(raw.as_ref(), LAST_NAME_MAX)
    }

    fn bounded(raw: &str, max: usize) -> Result<Self, ContactValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ContactValidationError::EmptyName);
        }
        let length = trimmed.chars().count();
        if !(NAME_MIN..=max).contains(&length) {
            return Err(ContactValidationError::NameLength { min: NAME_MIN, max });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?3?8?(0\d{9})$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Ukrainian-format phone number, with or without the `+38` prefix.
///
/// # Examples
/// ```
/// use contactbook::domain::PhoneNumber;
///
/// assert!(PhoneNumber::new("+380501234567").is_ok());
/// assert!(PhoneNumber::new("0501234567").is_ok());
/// assert!(PhoneNumber::new("12345").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let trimmed = raw.as_ref().trim();
        if !phone_regex().is_match(trimmed) {
            return Err(ContactValidationError::InvalidPhone);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated contact fields supplied on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub birth_date: NaiveDate,
    pub friend_status: bool,
}

impl ContactDraft {
    /// Validate raw field values.
    pub fn try_from_parts(
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
        birth_date: NaiveDate,
        friend_status: bool,
    ) -> Result<Self, ContactValidationError> {
        Ok(Self {
            first_name: PersonName::first(first_name)?,
            last_name: PersonName::last(last_name)?,
            email: EmailAddress::new(email)?,
            phone: PhoneNumber::new(phone)?,
            birth_date,
            friend_status,
        })
    }
}

/// Persisted contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub owner_id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub birth_date: NaiveDate,
    pub friend_status: bool,
}

impl Contact {
    /// Materialise a draft under a fresh identifier.
    pub fn from_draft(id: ContactId, owner_id: UserId, draft: ContactDraft) -> Self {
        let ContactDraft {
            first_name,
            last_name,
            email,
            phone,
            birth_date,
            friend_status,
        } = draft;
        Self {
            id,
            owner_id,
            first_name,
            last_name,
            email,
            phone,
            birth_date,
            friend_status,
        }
    }

    /// Replace every editable field with the draft values.
    pub fn apply(&mut self, draft: ContactDraft) {
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.email = draft.email;
        self.phone = draft.phone;
        self.birth_date = draft.birth_date;
        self.friend_status = draft.friend_status;
    }
}

fn anniversary_in(year: i32, birth_date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birth_date.month(), birth_date.day())
        // 29 February falls back to 28 February in common years.
        .or_else(|| NaiveDate::from_ymd_opt(year, birth_date.month(), birth_date.day() - 1))
}

/// Days from `today` until the next anniversary of `birth_date`.
///
/// Returns `0` when the birthday is today.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use contactbook::domain::days_until_birthday;
///
/// let today = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
/// let born = NaiveDate::from_ymd_opt(1990, 1, 2).unwrap();
/// assert_eq!(days_until_birthday(born, today), 3);
/// ```
pub fn days_until_birthday(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    let this_year = anniversary_in(today.year(), birth_date);
    let next = match this_year {
        Some(date) if date >= today => Some(date),
        _ => anniversary_in(today.year() + 1, birth_date),
    };
    next.map_or(i64::MAX, |date| (date - today).num_days())
}

/// Whether the birthday falls within the next week (inclusive).
pub fn is_upcoming_birthday(birth_date: NaiveDate, today: NaiveDate) -> bool {
    days_until_birthday(birth_date, today) <= UPCOMING_BIRTHDAY_DAYS
}
