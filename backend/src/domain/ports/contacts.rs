//! Driving port for address-book use-cases.

use async_trait::async_trait;

use crate::domain::{Contact, ContactDraft, ContactId, EmailAddress, Error, Page, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Contacts: Send + Sync {
    async fn list(&self, owner: &User, page: Page) -> Result<Vec<Contact>, Error>;

    /// Every owner's contacts; staff only.
    async fn list_all(&self, actor: &User, page: Page) -> Result<Vec<Contact>, Error>;

    async fn upcoming_birthdays(&self, owner: &User, page: Page) -> Result<Vec<Contact>, Error>;

    async fn by_first_name(
        &self,
        owner: &User,
        first_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, Error>;

    async fn by_last_name(
        &self,
        owner: &User,
        last_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, Error>;

    async fn by_email(&self, owner: &User, email: &EmailAddress) -> Result<Contact, Error>;

    async fn get(&self, owner: &User, id: &ContactId) -> Result<Contact, Error>;

    async fn create(&self, owner: &User, draft: ContactDraft) -> Result<Contact, Error>;

    async fn update(
        &self,
        owner: &User,
        id: &ContactId,
        draft: ContactDraft,
    ) -> Result<Contact, Error>;

    async fn delete(&self, owner: &User, id: &ContactId) -> Result<Contact, Error>;
}
