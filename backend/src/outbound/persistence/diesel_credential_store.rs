//! PostgreSQL-backed `CredentialStore` implementation using Diesel ORM.
//!
//! Users and phones are separate tables joined by `phones.user_id`. Reads
//! load the user rows first and then every phone for those users in one
//! query, ordered by phone id.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{NewPhone, NewUser, Phone, User, UserId};

use super::models::{LastLoginUpdate, NewPhoneRow, NewUserRow, PhoneRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{phones, users};

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `CredentialStore` port.
#[derive(Clone)]
pub struct DieselCredentialStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselCredentialStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> CredentialStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CredentialStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: DieselError) -> CredentialStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(EMAIL_UNIQUE_CONSTRAINT) =>
        {
            CredentialStoreError::duplicate_email()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CredentialStoreError::connection("database connection error")
        }
        DieselError::NotFound => CredentialStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => CredentialStoreError::query("database query error"),
        _ => CredentialStoreError::query("database error"),
    }
}

async fn load_phones(
    conn: &mut AsyncPgConnection,
    owners: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<Phone>>, CredentialStoreError> {
    if owners.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<PhoneRow> = phones::table
        .filter(phones::user_id.eq_any(owners))
        .order(phones::id.asc())
        .select(PhoneRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut grouped: HashMap<Uuid, Vec<Phone>> = HashMap::new();
    for row in rows {
        grouped.entry(row.user_id).or_default().push(Phone::from(row));
    }
    Ok(grouped)
}

async fn attach_phones(
    conn: &mut AsyncPgConnection,
    row: Option<UserRow>,
) -> Result<Option<User>, CredentialStoreError> {
    let Some(row) = row else {
        return Ok(None);
    };
    let mut phones = load_phones(conn, vec![row.id]).await?;
    let owned = phones.remove(&row.id).unwrap_or_default();
    Ok(Some(row.into_user(owned)))
}

#[async_trait]
impl CredentialStore for DieselCredentialStore {
    async fn find_all(&self) -> Result<Vec<User>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order((users::created.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ids = rows.iter().map(|row| row.id).collect();
        let mut phones = load_phones(&mut conn, ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let owned = phones.remove(&row.id).unwrap_or_default();
                row.into_user(owned)
            })
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        attach_phones(&mut conn, row).await
    }

    async fn save_user(&self, user: &NewUser) -> Result<User, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = self.clock.utc();

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            name: &user.name,
            email: &user.email,
            password: user.password.as_str(),
            is_active: user.is_active,
            created: now,
            modified: now,
            last_login: now,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row.into_user(Vec::new()))
    }

    async fn save_phone(&self, phone: &NewPhone) -> Result<Phone, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewPhoneRow {
            user_id: *phone.user_id.as_uuid(),
            number: phone.number.as_deref(),
            city_code: phone.city_code.as_deref(),
            country_code: phone.country_code.as_deref(),
        };

        let row: PhoneRow = diesel::insert_into(phones::table)
            .values(&new_row)
            .returning(PhoneRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|error| match error {
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    CredentialStoreError::unknown_owner(phone.user_id.to_string())
                }
                other => map_diesel_error(other),
            })?;

        Ok(Phone::from(row))
    }

    async fn touch_last_login(&self, id: &UserId) -> Result<(), CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = self.clock.utc();

        diesel::update(users::table.find(id.as_uuid()))
            .set(&LastLoginUpdate {
                modified: now,
                last_login: now,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
