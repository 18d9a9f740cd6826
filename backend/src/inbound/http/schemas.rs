//! Response bodies shared across handler modules.
//!
//! Domain types stay free of wire concerns; these DTOs fix the JSON shape
//! (camelCase entities, OAuth2 snake_case token responses) and carry the
//! OpenAPI schema.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Contact, Role, TokenPair, User};

/// Public view of an account. Hashes and tokens never leave the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            avatar: user.avatar.clone(),
            role: user.role,
            confirmed: user.confirmed,
            created_at: user.created_at,
        }
    }
}

/// OAuth2-style token response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer".to_owned(),
        }
    }
}

/// Single human-readable outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Stored contact as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Grace")]
    pub first_name: String,
    #[schema(example = "Hopper")]
    pub last_name: String,
    #[schema(example = "grace@example.com")]
    pub email: String,
    #[schema(example = "+380501234567")]
    pub phone: String,
    pub birth_date: NaiveDate,
    pub friend_status: bool,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: *contact.id.as_uuid(),
            owner_id: *contact.owner_id.as_uuid(),
            first_name: contact.first_name.as_ref().to_owned(),
            last_name: contact.last_name.as_ref().to_owned(),
            email: contact.email.to_string(),
            phone: contact.phone.as_ref().to_owned(),
            birth_date: contact.birth_date,
            friend_status: contact.friend_status,
        }
    }
}

pub(crate) fn contact_list(contacts: Vec<Contact>) -> Vec<ContactResponse> {
    contacts.into_iter().map(ContactResponse::from).collect()
}
