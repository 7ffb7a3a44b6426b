//! Driven port for user and phone persistence.
//!
//! Stores assign identity and timestamps. Users and phones live in separate
//! tables joined by `user_id`; reads return a `User` carrying a snapshot of
//! its phones ordered by phone id.

use async_trait::async_trait;

use crate::domain::{NewPhone, NewUser, Phone, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store adapters.
    pub enum CredentialStoreError {
        /// Backing store could not be reached.
        Connection { message: String } => "credential store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "credential store query failed: {message}",
        /// Another user already owns the email.
        DuplicateEmail => "email already registered",
        /// A phone referenced a user that does not exist.
        UnknownOwner { user_id: String } => "phone owner {user_id} does not exist",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Every user, ordered by creation time then id.
    async fn find_all(&self) -> Result<Vec<User>, CredentialStoreError>;

    /// Exact, case-sensitive email lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialStoreError>;

    /// Persist a new user, assigning id and timestamps.
    ///
    /// Fails with [`CredentialStoreError::DuplicateEmail`] when the email is
    /// taken.
    async fn save_user(&self, user: &NewUser) -> Result<User, CredentialStoreError>;

    /// Persist a phone for an existing user, assigning its id.
    async fn save_phone(&self, phone: &NewPhone) -> Result<Phone, CredentialStoreError>;

    /// Refresh `last_login` and `modified` to the store's current time.
    async fn touch_last_login(&self, id: &UserId) -> Result<(), CredentialStoreError>;
}
