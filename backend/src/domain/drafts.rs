//! Unvalidated workflow inputs and their results.
//!
//! Inbound adapters build these from transport payloads. Every field a client
//! may omit is an `Option` so the workflows, not the deserialiser, decide how
//! absence is reported.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::{NewPhone, User, UserId};

/// Phone entry as submitted during registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneDraft {
    pub number: Option<String>,
    pub city_code: Option<String>,
    pub country_code: Option<String>,
}

impl PhoneDraft {
    /// Link the draft to its stored owner.
    pub fn link(self, user_id: &UserId) -> NewPhone {
        NewPhone {
            user_id: user_id.clone(),
            number: self.number,
            city_code: self.city_code,
            country_code: self.country_code,
        }
    }
}

/// Registration request as received from a client.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub phones: Vec<PhoneDraft>,
}

/// Successful registration result.
///
/// Only identity, timestamps and the active flag are echoed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub id: UserId,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub is_active: bool,
}

impl From<&User> for RegistrationReceipt {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            created: user.created,
            modified: user.modified,
            last_login: user.last_login,
            is_active: user.is_active,
        }
    }
}

/// Email/password pair used by token issuance and login.
#[derive(Debug, Clone, Default)]
pub struct CredentialsDraft {
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
}

impl CredentialsDraft {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(Zeroizing::new(password.into())),
        }
    }

    /// Both fields, when present.
    pub fn parts(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Some((email, password.as_str())),
            _ => None,
        }
    }
}

/// Bearer token handed to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
}

/// Request headers relevant to the login workflow.
///
/// Names are matched case-insensitively.
///
/// # Examples
/// ```
/// use accounts::domain::RequestMetadata;
///
/// let meta = RequestMetadata::default().with_header("Authorization", "Bearer abc");
/// assert_eq!(meta.bearer_token(), Some("abc"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    headers: BTreeMap<String, String>,
}

const AUTHORIZATION: &str = "authorization";
const BEARER_PREFIX: &str = "bearer ";

impl RequestMetadata {
    /// Record a header, replacing any previous value under the same name.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Token from the `authorization` header with any `Bearer ` scheme removed.
    pub fn bearer_token(&self) -> Option<&str> {
        let raw = self.get(AUTHORIZATION)?.trim();
        let stripped = raw
            .get(..BEARER_PREFIX.len())
            .filter(|scheme| scheme.eq_ignore_ascii_case(BEARER_PREFIX))
            .and_then(|_| raw.get(BEARER_PREFIX.len()..))
            .unwrap_or(raw);
        Some(stripped.trim_start())
    }
}

/// Successful login result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub message: String,
}
