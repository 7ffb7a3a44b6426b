//! Driving port for the account workflows.
//!
//! Inbound adapters depend on this trait only, so HTTP handler tests can
//! substitute a double instead of wiring stores and codecs.

use async_trait::async_trait;

use crate::domain::{
    CredentialsDraft, Error, IssuedToken, LoginOutcome, RegistrationDraft, RegistrationReceipt,
    RequestMetadata, User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// All stored users in a stable order.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Validate and persist a new user with its phones.
    async fn register(&self, draft: RegistrationDraft) -> Result<RegistrationReceipt, Error>;

    /// Issue a bearer token for a known email.
    async fn issue_token(&self, credentials: CredentialsDraft) -> Result<IssuedToken, Error>;

    /// Check credentials and the bearer token in `metadata`.
    async fn login(
        &self,
        credentials: CredentialsDraft,
        metadata: RequestMetadata,
    ) -> Result<LoginOutcome, Error>;
}
