//! Shared Diesel error mapping for the repositories in this module.
//!
//! Repositories pass their port error constructors in, so each adapter
//! family maps failures in exactly one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    connection(error.into_message())
}

/// Constructors used by [`map_diesel_error`].
pub(crate) struct ErrorCtors<Q, C, U> {
    pub query: Q,
    pub connection: C,
    pub conflict: U,
}

/// Map Diesel errors into query, connection or unique-violation errors.
pub(crate) fn map_diesel_error<E, Q, C, U>(error: DieselError, ctors: ErrorCtors<Q, C, U>) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
    U: FnOnce(String) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => (ctors.query)("record not found"),
        DieselError::QueryBuilderError(_) => (ctors.query)("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            (ctors.conflict)(info.constraint_name().unwrap_or("unique").to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            (ctors.connection)("database connection error")
        }
        _ => (ctors.query)("database error"),
    }
}
