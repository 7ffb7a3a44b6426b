//! Domain ports and supporting types for the hexagonal boundary.
//!
//! `UserAccounts` is the driving port inbound adapters call. The driven
//! ports (`CredentialStore`, `TokenCodec`, `PasswordHasher`) describe what the
//! workflows need from infrastructure, each with a typed error enum.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_store;
mod password_hasher;
mod token_codec;
mod user_accounts;

#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenCodec, TokenCodecError};
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::UserAccounts;
