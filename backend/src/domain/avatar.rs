//! Avatar URLs.

use sha2::{Digest, Sha256};
use url::Url;

use super::user::EmailAddress;

const GRAVATAR_BASE: &str = "https://www.gravatar.com/avatar/";

/// Longest avatar URL the `users.avatar` column holds.
pub const AVATAR_URL_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvatarError {
    #[error("avatar must be an absolute URL")]
    NotAUrl,
    #[error("avatar URL must use http or https")]
    UnsupportedScheme,
    #[error("avatar URL must be at most {max} characters")]
    TooLong { max: usize },
}

impl AvatarError {
    /// Machine-readable code reported in error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAUrl | Self::UnsupportedScheme => "invalid_url",
            Self::TooLong { .. } => "invalid_length",
        }
    }
}

/// Default avatar derived from the account email.
///
/// # Examples
/// ```
/// use contactbook::domain::{EmailAddress, gravatar_url};
///
/// let email = EmailAddress::new("ada@example.com").unwrap();
/// assert!(gravatar_url(&email).starts_with("https://www.gravatar.com/avatar/"));
/// ```
pub fn gravatar_url(email: &EmailAddress) -> String {
    let digest = Sha256::digest(email.as_ref().as_bytes());
    format!("{GRAVATAR_BASE}{}", hex::encode(digest))
}

/// Validate a user-supplied avatar URL.
///
/// The length cap applies to both the input and the normalised URL that
/// gets stored.
pub fn parse_avatar_url(raw: &str) -> Result<Url, AvatarError> {
    let too_long = AvatarError::TooLong { max: AVATAR_URL_MAX };
    let raw = raw.trim();
    if raw.chars().count() > AVATAR_URL_MAX {
        return Err(too_long);
    }
    let url = Url::parse(raw).map_err(|_| AvatarError::NotAUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AvatarError::UnsupportedScheme);
    }
    if url.as_str().chars().count() > AVATAR_URL_MAX {
        return Err(too_long);
    }
    Ok(url)
}
