//! Address-book service.
//!
//! Implements the [`Contacts`] driving port. Every operation is scoped to
//! the calling user except [`Contacts::list_all`], which is reserved for
//! staff roles. Empty list results surface as `404 NOT FOUND`.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{ContactPersistenceError, ContactRepository, Contacts};
use crate::domain::{
    Contact, ContactDraft, ContactId, EmailAddress, Error, Page, STAFF_ONLY, User,
    is_upcoming_birthday,
};

const NOT_FOUND: &str = "NOT FOUND";
const EMAIL_EXISTING: &str = "EMAIL EXISTING";

/// Bounds for name search terms.
const SEARCH_MIN: usize = 3;
const SEARCH_MAX: usize = 50;

fn map_contact_error(error: ContactPersistenceError) -> Error {
    match error {
        ContactPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("contact repository unavailable: {message}"))
        }
        ContactPersistenceError::Query { message } => {
            Error::internal(format!("contact repository error: {message}"))
        }
        ContactPersistenceError::Conflict { .. } => Error::conflict(EMAIL_EXISTING),
    }
}

fn non_empty(contacts: Vec<Contact>) -> Result<Vec<Contact>, Error> {
    if contacts.is_empty() {
        Err(Error::not_found(NOT_FOUND))
    } else {
        Ok(contacts)
    }
}

fn search_term<'a>(raw: &'a str, field: &'static str) -> Result<&'a str, Error> {
    let term = raw.trim();
    let length = term.chars().count();
    if (SEARCH_MIN..=SEARCH_MAX).contains(&length) {
        Ok(term)
    } else {
        Err(
            Error::invalid_request(format!(
                "{field} must be between {SEARCH_MIN} and {SEARCH_MAX} characters"
            ))
            .with_details(json!({ "field": field, "code": "invalid_length" })),
        )
    }
}

/// Contact service backed by a contact repository.
#[derive(Clone)]
pub struct ContactsService<C> {
    contacts: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C> ContactsService<C> {
    pub fn new(contacts: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { contacts, clock }
    }
}

#[async_trait]
impl<C: ContactRepository> Contacts for ContactsService<C> {
    async fn list(&self, owner: &User, page: Page) -> Result<Vec<Contact>, Error> {
        let contacts = self
            .contacts
            .list_for_owner(&owner.id, page)
            .await
            .map_err(map_contact_error)?;
        non_empty(contacts)
    }

    async fn list_all(&self, actor: &User, page: Page) -> Result<Vec<Contact>, Error> {
        STAFF_ONLY.check(actor)?;
        let contacts = self
            .contacts
            .list_all(page)
            .await
            .map_err(map_contact_error)?;
        non_empty(contacts)
    }

    async fn upcoming_birthdays(&self, owner: &User, page: Page) -> Result<Vec<Contact>, Error> {
        let today = self.clock.utc().date_naive();
        let contacts = self
            .contacts
            .list_for_owner(&owner.id, page)
            .await
            .map_err(map_contact_error)?;
        non_empty(
            contacts
                .into_iter()
                .filter(|contact| is_upcoming_birthday(contact.birth_date, today))
                .collect(),
        )
    }

    async fn by_first_name(
        &self,
        owner: &User,
        first_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, Error> {
        let term = search_term(first_name, "first_name")?;
        let contacts = self
            .contacts
            .find_by_first_name(&owner.id, term, page)
            .await
            .map_err(map_contact_error)?;
        non_empty(contacts)
    }

    async fn by_last_name(
        &self,
        owner: &User,
        last_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, Error> {
        let term = search_term(last_name, "last_name")?;
        let contacts = self
            .contacts
            .find_by_last_name(&owner.id, term, page)
            .await
            .map_err(map_contact_error)?;
        non_empty(contacts)
    }

    async fn by_email(&self, owner: &User, email: &EmailAddress) -> Result<Contact, Error> {
        self.contacts
            .find_by_email(&owner.id, email)
            .await
            .map_err(map_contact_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn get(&self, owner: &User, id: &ContactId) -> Result<Contact, Error> {
        self.contacts
            .find_by_id(&owner.id, id)
            .await
            .map_err(map_contact_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn create(&self, owner: &User, draft: ContactDraft) -> Result<Contact, Error> {
        let taken = self
            .contacts
            .email_taken(&owner.id, &draft.email, None)
            .await
            .map_err(map_contact_error)?;
        if taken {
            return Err(Error::conflict(EMAIL_EXISTING));
        }
        let contact = Contact::from_draft(ContactId::random(), owner.id, draft);
        self.contacts
            .create(&contact)
            .await
            .map_err(map_contact_error)?;
        Ok(contact)
    }

    async fn update(
        &self,
        owner: &User,
        id: &ContactId,
        draft: ContactDraft,
    ) -> Result<Contact, Error> {
        let mut contact = self.get(owner, id).await?;
        let taken = self
            .contacts
            .email_taken(&owner.id, &draft.email, Some(*id))
            .await
            .map_err(map_contact_error)?;
        if taken {
            return Err(Error::conflict(EMAIL_EXISTING));
        }
        contact.apply(draft);
        self.contacts
            .update(&contact)
            .await
            .map_err(map_contact_error)?;
        Ok(contact)
    }

    async fn delete(&self, owner: &User, id: &ContactId) -> Result<Contact, Error> {
        self.contacts
            .delete(&owner.id, id)
            .await
            .map_err(map_contact_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}
