//! Domain ports for the hexagonal boundary.
//!
//! Driving ports ([`Accounts`], [`Contacts`]) are called by inbound
//! adapters. Driven ports (repositories, [`Mailer`], [`ConnectivityProbe`])
//! are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod connectivity;
mod contact_repository;
mod contacts;
mod mailer;
mod user_repository;

#[cfg(test)]
pub use accounts::MockAccounts;
pub use accounts::Accounts;
#[cfg(test)]
pub use connectivity::MockConnectivityProbe;
pub use connectivity::{ConnectivityError, ConnectivityProbe, FixtureConnectivityProbe};
#[cfg(test)]
pub use contact_repository::MockContactRepository;
pub use contact_repository::{ContactPersistenceError, ContactRepository};
#[cfg(test)]
pub use contacts::MockContacts;
pub use contacts::Contacts;
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{EmailKind, EmailMessage, FixtureMailer, Mailer, MailerError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
