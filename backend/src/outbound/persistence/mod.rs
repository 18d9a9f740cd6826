//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Rows (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module; every failure is mapped to the port's error type.
//!
//! # Example
//!
//! ```ignore
//! use contactbook::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/contacts")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_connectivity_probe;
mod diesel_contact_repository;
mod diesel_error_mapping;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_connectivity_probe::DieselConnectivityProbe;
pub use diesel_contact_repository::DieselContactRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
