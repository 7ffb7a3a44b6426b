//! Account workflows: registration, token issuance, login and listing.
//!
//! This module implements the `UserAccounts` driving port on top of the
//! credential store, token codec and password hasher driven ports. Each
//! workflow checks its gates in a fixed order and stops at the first failure.
//! Password hashing runs on tokio's blocking pool so key derivation never
//! stalls the request workers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    CredentialStore, CredentialStoreError, PasswordHashError, PasswordHasher, TokenCodec,
    TokenCodecError, UserAccounts,
};
use crate::domain::{
    CredentialsDraft, Error, FieldError, IssuedToken, LoginOutcome, NewUser, RegistrationDraft,
    RegistrationReceipt, RequestMetadata, User, UserValidator,
};

/// Message returned when a login passes every gate.
pub const LOGIN_SUCCESS_MESSAGE: &str = "Te has logueado ;D";

const TOKEN_MISSING_FIELDS: &str = "Email o contrasena invalidos";
const TOKEN_UNKNOWN_EMAIL: &str = "Email invalido";
const LOGIN_MISSING_FIELDS: &str = "Email y contrasena son campos requeridos";
const LOGIN_UNKNOWN_EMAIL: &str = "Email enviado no existe";
const LOGIN_PASSWORD_MISMATCH: &str = "Email o contrasena invalidos";
const LOGIN_MISSING_BEARER: &str = "bearer token es un campo necesario";
const LOGIN_INVALID_TOKEN: &str = "token invalido";

/// Account service implementing the driving port.
pub struct AccountsService<S: ?Sized, T: ?Sized, H: ?Sized> {
    store: Arc<S>,
    tokens: Arc<T>,
    hasher: Arc<H>,
}

impl<S: ?Sized, T: ?Sized, H: ?Sized> Clone for AccountsService<S, T, H> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tokens: Arc::clone(&self.tokens),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<S: ?Sized, T: ?Sized, H: ?Sized> AccountsService<S, T, H> {
    /// Create a new service over the given driven ports.
    pub fn new(store: Arc<S>, tokens: Arc<T>, hasher: Arc<H>) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }
}

impl<S, T, H> AccountsService<S, T, H>
where
    S: CredentialStore + ?Sized,
    T: TokenCodec + ?Sized,
    H: PasswordHasher + ?Sized + 'static,
{
    fn map_store_error(error: CredentialStoreError) -> Error {
        match error {
            CredentialStoreError::Connection { message } => {
                Error::service_unavailable(format!("credential store unavailable: {message}"))
            }
            CredentialStoreError::Query { message } => {
                Error::internal(format!("credential store error: {message}"))
            }
            CredentialStoreError::DuplicateEmail => {
                Error::validation_failure(vec![FieldError::DuplicateEmail.to_string()])
            }
            CredentialStoreError::UnknownOwner { user_id } => {
                Error::internal(format!("phone owner {user_id} vanished during registration"))
            }
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(format!("password hashing failed: {error}"))
    }

    fn map_codec_error(error: TokenCodecError) -> Error {
        Error::internal(format!("token codec failed: {error}"))
    }

    /// Run `work` against the hasher on the blocking pool.
    async fn with_hasher<R, F>(&self, work: F) -> Result<R, Error>
    where
        F: FnOnce(&H) -> R + Send + 'static,
        R: Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || work(hasher.as_ref()))
            .await
            .map_err(|err| Error::internal(format!("password task failed: {err}")))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.store
            .find_by_email(email)
            .await
            .map_err(Self::map_store_error)
    }

    async fn record_login(&self, user: &User) {
        if let Err(error) = self.store.touch_last_login(&user.id).await {
            warn!(user_id = %user.id, %error, "failed to refresh last login");
        }
    }
}

#[async_trait]
impl<S, T, H> UserAccounts for AccountsService<S, T, H>
where
    S: CredentialStore + ?Sized,
    T: TokenCodec + ?Sized,
    H: PasswordHasher + ?Sized + 'static,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        let users = self.store.find_all().await.map_err(Self::map_store_error)?;
        debug!(count = users.len(), "listed users");
        Ok(users)
    }

    async fn register(&self, draft: RegistrationDraft) -> Result<RegistrationReceipt, Error> {
        let violations = UserValidator::shared().validate(&draft);
        if !violations.is_empty() {
            info!(violations = violations.len(), "registration rejected");
            return Err(Error::validation_failure(
                violations.iter().map(ToString::to_string).collect(),
            ));
        }

        let RegistrationDraft {
            name,
            email,
            password,
            phones,
        } = draft;
        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(Error::internal("validated draft lost a required field"));
        };

        let digest = self
            .with_hasher(move |hasher| hasher.hash(password.as_str()))
            .await?
            .map_err(Self::map_hash_error)?;
        let new_user = NewUser {
            name,
            email,
            password: digest,
            is_active: true,
        };
        let mut user = self
            .store
            .save_user(&new_user)
            .await
            .map_err(Self::map_store_error)?;

        // Phones are written one by one after the user row; a failure here
        // leaves the user with the phones saved so far.
        for phone in phones {
            let stored = self
                .store
                .save_phone(&phone.link(&user.id))
                .await
                .map_err(Self::map_store_error)?;
            user.phones.push(stored);
        }

        info!(user_id = %user.id, phones = user.phones.len(), "user registered");
        Ok(RegistrationReceipt::from(&user))
    }

    async fn issue_token(&self, credentials: CredentialsDraft) -> Result<IssuedToken, Error> {
        let Some((email, _password)) = credentials.parts() else {
            return Err(Error::missing_field(TOKEN_MISSING_FIELDS));
        };

        let Some(user) = self.find_by_email(email).await? else {
            info!("token requested for unknown email");
            return Err(Error::not_found(TOKEN_UNKNOWN_EMAIL));
        };

        let token = self
            .tokens
            .generate(&user)
            .await
            .map_err(Self::map_codec_error)?;
        info!(user_id = %user.id, "token issued");
        Ok(IssuedToken { token })
    }

    async fn login(
        &self,
        credentials: CredentialsDraft,
        metadata: RequestMetadata,
    ) -> Result<LoginOutcome, Error> {
        let Some((email, password)) = credentials.parts() else {
            return Err(Error::missing_field(LOGIN_MISSING_FIELDS));
        };

        let Some(user) = self.find_by_email(email).await? else {
            info!("login attempted for unknown email");
            return Err(Error::not_found(LOGIN_UNKNOWN_EMAIL));
        };

        let candidate = Zeroizing::new(password.to_owned());
        let digest = user.password.clone();
        let matches = self
            .with_hasher(move |hasher| hasher.verify(candidate.as_str(), &digest))
            .await?;
        if !matches {
            info!(user_id = %user.id, "login rejected: password mismatch");
            return Err(Error::credential_mismatch(LOGIN_PASSWORD_MISMATCH));
        }

        let Some(bearer) = metadata.bearer_token() else {
            info!(user_id = %user.id, "login rejected: bearer token missing");
            return Err(Error::missing_field(LOGIN_MISSING_BEARER));
        };

        match self.tokens.validate(bearer, &user).await {
            Ok(true) => {}
            Ok(false) => {
                info!(user_id = %user.id, "login rejected: token does not match");
                return Err(Error::credential_mismatch(LOGIN_INVALID_TOKEN));
            }
            Err(TokenCodecError::Malformed) => {
                info!(user_id = %user.id, "login rejected: malformed token");
                return Err(Error::malformed_token(LOGIN_INVALID_TOKEN));
            }
            Err(error) => return Err(Self::map_codec_error(error)),
        }

        self.record_login(&user).await;
        info!(user_id = %user.id, "login succeeded");
        Ok(LoginOutcome {
            message: LOGIN_SUCCESS_MESSAGE.to_owned(),
        })
    }
}
