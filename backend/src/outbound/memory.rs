//! In-process credential store.
//!
//! Users and phones are kept in separate row lists joined by `user_id`, the
//! same shape as the relational schema. Used when no database URL is
//! configured and by tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{NewPhone, NewUser, PasswordDigest, Phone, PhoneId, User, UserId};

#[derive(Debug, Clone)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    password: PasswordDigest,
    is_active: bool,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    last_login: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<UserRow>,
    phones: Vec<Phone>,
    last_phone_id: i64,
}

impl Tables {
    fn assemble(&self, row: &UserRow) -> User {
        let mut phones: Vec<Phone> = self
            .phones
            .iter()
            .filter(|phone| phone.user_id == row.id)
            .cloned()
            .collect();
        phones.sort_by_key(|phone| phone.id);
        User {
            id: row.id.clone(),
            name: row.name.clone(),
            email: row.email.clone(),
            password: row.password.clone(),
            is_active: row.is_active,
            created: row.created,
            modified: row.modified,
            last_login: row.last_login,
            phones,
        }
    }

    fn find<P>(&self, predicate: P) -> Option<User>
    where
        P: Fn(&UserRow) -> bool,
    {
        self.users
            .iter()
            .find(|row| predicate(row))
            .map(|row| self.assemble(row))
    }
}

/// Credential store holding all rows in memory.
pub struct InMemoryCredentialStore {
    tables: Mutex<Tables>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCredentialStore {
    /// Create an empty store stamping rows with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, CredentialStoreError> {
        self.tables
            .lock()
            .map_err(|_| CredentialStoreError::query("in-memory store lock poisoned"))
    }

    /// Number of stored phones across all users.
    pub fn phone_count(&self) -> Result<usize, CredentialStoreError> {
        Ok(self.lock()?.phones.len())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_all(&self) -> Result<Vec<User>, CredentialStoreError> {
        let tables = self.lock()?;
        let mut rows: Vec<&UserRow> = tables.users.iter().collect();
        rows.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(rows.into_iter().map(|row| tables.assemble(row)).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialStoreError> {
        Ok(self.lock()?.find(|row| row.email == email))
    }

    async fn save_user(&self, user: &NewUser) -> Result<User, CredentialStoreError> {
        let now = self.clock.utc();
        let mut tables = self.lock()?;
        if tables.users.iter().any(|row| row.email == user.email) {
            return Err(CredentialStoreError::duplicate_email());
        }
        let row = UserRow {
            id: UserId::random(),
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            is_active: user.is_active,
            created: now,
            modified: now,
            last_login: now,
        };
        let stored = tables.assemble(&row);
        tables.users.push(row);
        Ok(stored)
    }

    async fn save_phone(&self, phone: &NewPhone) -> Result<Phone, CredentialStoreError> {
        let mut tables = self.lock()?;
        if !tables.users.iter().any(|row| row.id == phone.user_id) {
            return Err(CredentialStoreError::unknown_owner(phone.user_id.to_string()));
        }
        tables.last_phone_id += 1;
        let stored = Phone {
            id: PhoneId::new(tables.last_phone_id),
            user_id: phone.user_id.clone(),
            number: phone.number.clone(),
            city_code: phone.city_code.clone(),
            country_code: phone.country_code.clone(),
        };
        tables.phones.push(stored.clone());
        Ok(stored)
    }

    async fn touch_last_login(&self, id: &UserId) -> Result<(), CredentialStoreError> {
        let now = self.clock.utc();
        let mut tables = self.lock()?;
        if let Some(row) = tables.users.iter_mut().find(|row| row.id == *id) {
            row.last_login = now;
            row.modified = now;
        }
        Ok(())
    }
}
