//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; the store converts them
//! into domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{phones, users};
use crate::domain::{PasswordDigest, Phone, PhoneId, User, UserId};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_active: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl UserRow {
    /// Convert to a domain user carrying `phones`.
    pub fn into_user(self, phones: Vec<Phone>) -> User {
        User {
            id: UserId::from_uuid(self.id),
            name: self.name,
            email: self.email,
            password: PasswordDigest::new(self.password),
            is_active: self.is_active,
            created: self.created,
            modified: self.modified,
            last_login: self.last_login,
            phones,
        }
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub is_active: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// Changeset applied after a successful login.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct LastLoginUpdate {
    pub modified: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// Row struct for reading from the phones table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = phones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PhoneRow {
    pub id: i64,
    pub user_id: Uuid,
    pub number: Option<String>,
    pub city_code: Option<String>,
    pub country_code: Option<String>,
}

impl From<PhoneRow> for Phone {
    fn from(row: PhoneRow) -> Self {
        Self {
            id: PhoneId::new(row.id),
            user_id: UserId::from_uuid(row.user_id),
            number: row.number,
            city_code: row.city_code,
            country_code: row.country_code,
        }
    }
}

/// Insertable struct for creating phone records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = phones)]
pub(crate) struct NewPhoneRow<'a> {
    pub user_id: Uuid,
    pub number: Option<&'a str>,
    pub city_code: Option<&'a str>,
    pub country_code: Option<&'a str>,
}
