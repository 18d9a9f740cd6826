//! PostgreSQL-backed `ContactRepository` implementation using Diesel ORM.
//!
//! Every owner-scoped query filters on `owner_id` in SQL; nothing is
//! filtered after the fact.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ContactPersistenceError, ContactRepository};
use crate::domain::{
    Contact, ContactId, ContactValidationError, EmailAddress, Page, PersonName, PhoneNumber,
    UserId,
};

use super::diesel_error_mapping::{ErrorCtors, map_diesel_error, map_pool_error};
use super::models::{ContactRow, ContactUpdate, NewContactRow};
use super::pool::{DbPool, PoolError};
use super::schema::contacts;

/// Diesel-backed implementation of the [`ContactRepository`] port.
#[derive(Clone)]
pub struct DieselContactRepository {
    pool: DbPool,
}

impl DieselContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ContactPersistenceError {
    map_pool_error(error, ContactPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ContactPersistenceError {
    map_diesel_error(
        error,
        ErrorCtors {
            query: ContactPersistenceError::query,
            connection: ContactPersistenceError::connection,
            conflict: ContactPersistenceError::conflict,
        },
    )
}

fn row_to_contact(row: ContactRow) -> Result<Contact, ContactPersistenceError> {
    let id = row.id;
    let invalid = |err: ContactValidationError| {
        ContactPersistenceError::query(format!("invalid contact row {id}: {err}"))
    };
    Ok(Contact {
        id: ContactId::from(row.id),
        owner_id: UserId::from(row.owner_id),
        first_name: PersonName::first(&row.first_name).map_err(invalid)?,
        last_name: PersonName::last(&row.last_name).map_err(invalid)?,
        email: EmailAddress::new(&row.email)
            .map_err(|err| invalid(ContactValidationError::from(err)))?,
        phone: PhoneNumber::new(&row.phone).map_err(invalid)?,
        birth_date: row.birth_date,
        friend_status: row.friend_status,
    })
}

fn rows_to_contacts(rows: Vec<ContactRow>) -> Result<Vec<Contact>, ContactPersistenceError> {
    rows.into_iter().map(row_to_contact).collect()
}

fn limit_offset(page: Page) -> (i64, i64) {
    (i64::from(page.limit()), i64::from(page.offset()))
}

#[async_trait]
impl ContactRepository for DieselContactRepository {
    async fn list_for_owner(
        &self,
        owner: &UserId,
        page: Page,
    ) -> Result<Vec<Contact>, ContactPersistenceError> {
        let (limit, offset) = limit_offset(page);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = contacts::table
            .filter(contacts::owner_id.eq(owner.as_uuid()))
            .order((contacts::last_name, contacts::first_name, contacts::id))
            .limit(limit)
            .offset(offset)
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_contacts(rows)
    }

    async fn list_all(&self, page: Page) -> Result<Vec<Contact>, ContactPersistenceError> {
        let (limit, offset) = limit_offset(page);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = contacts::table
            .order((contacts::last_name, contacts::first_name, contacts::id))
            .limit(limit)
            .offset(offset)
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_contacts(rows)
    }

    async fn find_by_first_name(
        &self,
        owner: &UserId,
        first_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, ContactPersistenceError> {
        let (limit, offset) = limit_offset(page);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = contacts::table
            .filter(contacts::owner_id.eq(owner.as_uuid()))
            .filter(contacts::first_name.eq(first_name))
            .order((contacts::last_name, contacts::first_name, contacts::id))
            .limit(limit)
            .offset(offset)
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_contacts(rows)
    }

    async fn find_by_last_name(
        &self,
        owner: &UserId,
        last_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, ContactPersistenceError> {
        let (limit, offset) = limit_offset(page);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = contacts::table
            .filter(contacts::owner_id.eq(owner.as_uuid()))
            .filter(contacts::last_name.eq(last_name))
            .order((contacts::last_name, contacts::first_name, contacts::id))
            .limit(limit)
            .offset(offset)
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_contacts(rows)
    }

    async fn find_by_email(
        &self,
        owner: &UserId,
        email: &EmailAddress,
    ) -> Result<Option<Contact>, ContactPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<ContactRow> = contacts::table
            .filter(contacts::owner_id.eq(owner.as_uuid()))
            .filter(contacts::email.eq(email.as_ref()))
            .select(ContactRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_contact).transpose()
    }

    async fn find_by_id(
        &self,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ContactPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<ContactRow> = contacts::table
            .filter(contacts::owner_id.eq(owner.as_uuid()))
            .filter(contacts::id.eq(id.as_uuid()))
            .select(ContactRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_contact).transpose()
    }

    async fn email_taken(
        &self,
        owner: &UserId,
        email: &EmailAddress,
        excluding: Option<ContactId>,
    ) -> Result<bool, ContactPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let same_email = contacts::table
            .filter(contacts::owner_id.eq(owner.as_uuid()))
            .filter(contacts::email.eq(email.as_ref()));
        let found: Option<Uuid> = match excluding {
            Some(excluded) => {
                same_email
                    .filter(contacts::id.ne(*excluded.as_uuid()))
                    .select(contacts::id)
                    .first(&mut conn)
                    .await
            }
            None => same_email.select(contacts::id).first(&mut conn).await,
        }
        .optional()
        .map_err(diesel_error)?;
        Ok(found.is_some())
    }

    async fn create(&self, contact: &Contact) -> Result<(), ContactPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewContactRow {
            id: *contact.id.as_uuid(),
            owner_id: *contact.owner_id.as_uuid(),
            first_name: contact.first_name.as_ref(),
            last_name: contact.last_name.as_ref(),
            email: contact.email.as_ref(),
            phone: contact.phone.as_ref(),
            birth_date: contact.birth_date,
            friend_status: contact.friend_status,
        };
        diesel::insert_into(contacts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn update(&self, contact: &Contact) -> Result<(), ContactPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = ContactUpdate {
            first_name: contact.first_name.as_ref(),
            last_name: contact.last_name.as_ref(),
            email: contact.email.as_ref(),
            phone: contact.phone.as_ref(),
            birth_date: contact.birth_date,
            friend_status: contact.friend_status,
        };
        diesel::update(
            contacts::table
                .filter(contacts::id.eq(contact.id.as_uuid()))
                .filter(contacts::owner_id.eq(contact.owner_id.as_uuid())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(diesel_error)
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ContactPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<ContactRow> = diesel::delete(
            contacts::table
                .filter(contacts::id.eq(id.as_uuid()))
                .filter(contacts::owner_id.eq(owner.as_uuid())),
        )
        .returning(ContactRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;
        row.map(row_to_contact).transpose()
    }
}
