//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, NewUser, User, UserId, UserValidationError, Username};

use super::diesel_error_mapping::{ErrorCtors, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        ErrorCtors {
            query: UserPersistenceError::query,
            connection: UserPersistenceError::connection,
            conflict: UserPersistenceError::conflict,
        },
    )
}

/// Convert a stored row, rejecting values the domain would not accept.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = row.id;
    let invalid = |err: UserValidationError| {
        UserPersistenceError::query(format!("invalid user row {id}: {err}"))
    };
    Ok(User {
        id: UserId::from(row.id),
        username: Username::new(&row.username).map_err(invalid)?,
        email: EmailAddress::new(&row.email).map_err(invalid)?,
        role: row.role.parse().map_err(invalid)?,
        password_hash: row.password_hash,
        avatar: row.avatar,
        refresh_token: row.refresh_token,
        confirmed: row.confirmed,
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: &user.password_hash,
            avatar: user.avatar.as_deref(),
        };
        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        row_to_user(stored)
    }

    async fn set_refresh_token(
        &self,
        id: &UserId,
        token: Option<String>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set(users::refresh_token.eq(token))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn confirm_email(&self, email: &EmailAddress) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.filter(users::email.eq(email.as_ref())))
            .set(users::confirmed.eq(true))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.find(id.as_uuid()))
            .set(users::avatar.eq(avatar))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }
}
