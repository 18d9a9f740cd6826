//! Driven port for contact persistence.
//!
//! Every owner-scoped method filters on `owner` so adapters never leak
//! another user's contacts. List results are ordered by last name, then
//! first name, then id.

use async_trait::async_trait;

use crate::domain::{Contact, ContactId, EmailAddress, Page, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by contact repository adapters.
    pub enum ContactPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "contact repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "contact repository query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } => "contact already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn list_for_owner(
        &self,
        owner: &UserId,
        page: Page,
    ) -> Result<Vec<Contact>, ContactPersistenceError>;

    /// Contacts of every owner.
    async fn list_all(&self, page: Page) -> Result<Vec<Contact>, ContactPersistenceError>;

    async fn find_by_first_name(
        &self,
        owner: &UserId,
        first_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, ContactPersistenceError>;

    async fn find_by_last_name(
        &self,
        owner: &UserId,
        last_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, ContactPersistenceError>;

    async fn find_by_email(
        &self,
        owner: &UserId,
        email: &EmailAddress,
    ) -> Result<Option<Contact>, ContactPersistenceError>;

    async fn find_by_id(
        &self,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ContactPersistenceError>;

    /// Whether `owner` already has a contact with `email`, ignoring
    /// `excluding` when given.
    async fn email_taken(
        &self,
        owner: &UserId,
        email: &EmailAddress,
        excluding: Option<ContactId>,
    ) -> Result<bool, ContactPersistenceError>;

    async fn create(&self, contact: &Contact) -> Result<(), ContactPersistenceError>;

    /// Overwrite the stored record with the same id and owner.
    async fn update(&self, contact: &Contact) -> Result<(), ContactPersistenceError>;

    /// Remove the contact, returning it when it existed.
    async fn delete(
        &self,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ContactPersistenceError>;
}
