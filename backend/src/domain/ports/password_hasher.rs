//! Driven port for password digests.

use crate::domain::PasswordDigest;

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a digest.
    pub enum PasswordHashError {
        /// Salt generation or key derivation failed.
        Derivation { message: String } => "password derivation failed: {message}",
    }
}

/// Salted one-way password hashing.
///
/// Implementations compare digests in constant time.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError>;

    fn verify(&self, password: &str, digest: &PasswordDigest) -> bool;
}
