//! User and phone data model.
//!
//! Persisted aggregates (`User`, `Phone`) carry store-assigned identity and
//! timestamps. Unsaved counterparts (`NewUser`, `NewPhone`) have neither, so
//! a value that has not been through a store cannot be mistaken for one that
//! has.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdError {
    Empty,
    InvalidUuid,
}

impl fmt::Display for UserIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "user id must not be empty"),
            Self::InvalidUuid => write!(f, "user id must be a valid UUID"),
        }
    }
}

impl std::error::Error for UserIdError {}

/// Stable user identifier stored as a UUID.
///
/// The canonical lowercase hyphenated form is kept alongside the parsed value
/// so adapters can borrow either without reformatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserIdError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserIdError::Empty);
        }
        let parsed = Uuid::parse_str(id).map_err(|_| UserIdError::InvalidUuid)?;
        Ok(Self::from_uuid(parsed))
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.hyphenated().to_string())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.1)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.1
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Store-assigned numeric phone identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneId(i64);

impl PhoneId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PhoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Salted password digest in `pbkdf2-sha256$<rounds>$<salt>$<hash>` form.
///
/// The encoded value is opaque to the domain; only a
/// [`PasswordHasher`](crate::domain::ports::PasswordHasher) interprets it.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Phone record linked to its owning user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    pub id: PhoneId,
    pub user_id: UserId,
    pub number: Option<String>,
    pub city_code: Option<String>,
    pub country_code: Option<String>,
}

/// Persisted user snapshot.
///
/// ## Invariants
/// - `created == last_login` when the user is first stored.
/// - `modified >= created`.
/// - `phones` is ordered by phone id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: PasswordDigest,
    pub is_active: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub phones: Vec<Phone>,
}

/// Validated user awaiting its first save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: PasswordDigest,
    pub is_active: bool,
}

/// Phone awaiting its first save, already linked to a stored user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhone {
    pub user_id: UserId,
    pub number: Option<String>,
    pub city_code: Option<String>,
    pub country_code: Option<String>,
}
