//! Driven port for bearer token generation and validation.

use async_trait::async_trait;

use crate::domain::User;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token codecs.
    pub enum TokenCodecError {
        /// The token is not structurally a token (bad segments, encoding or JSON).
        Malformed => "token is malformed",
        /// Signing or key handling failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues and checks bearer tokens bound to a user.
///
/// `validate` separates a token that cannot be parsed (`Err(Malformed)`) from
/// one that parses but does not belong to `user` or has expired (`Ok(false)`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenCodec: Send + Sync {
    async fn generate(&self, user: &User) -> Result<String, TokenCodecError>;

    async fn validate(&self, token: &str, user: &User) -> Result<bool, TokenCodecError>;
}
