//! Integration tests for `DieselCredentialStore` against PostgreSQL.
//!
//! Each test migrates the database named by `ACCOUNTS_TEST_DATABASE_URL` and
//! truncates both tables first, so the variable must point at a scratch
//! database. Tests take a shared lock because they share that database.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use accounts::domain::ports::{CredentialStore, CredentialStoreError};
use accounts::domain::{NewPhone, NewUser, PasswordDigest, User, UserId};
use accounts::outbound::persistence::{DbPool, DieselCredentialStore, PoolConfig, run_migrations};
use chrono::{DateTime, TimeZone, Utc};
use diesel::QueryableByName;
use diesel::sql_types;
use diesel_async::RunQueryDsl;
use mockable::{Clock, MockClock};
use rstest::rstest;
use tokio::sync::{Mutex, MutexGuard};

mod support;

use support::test_database_url;

static DATABASE_LOCK: Mutex<()> = Mutex::const_new(());

struct Database {
    store: DieselCredentialStore,
    pool: DbPool,
    _guard: MutexGuard<'static, ()>,
}

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = sql_types::BigInt)]
    count: i64,
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0)
        .single()
        .expect("valid timestamp")
}

/// Clock advancing one minute per reading.
fn ticking_clock() -> Arc<dyn Clock> {
    let minute = AtomicU32::new(0);
    let mut clock = MockClock::new();
    clock
        .expect_utc()
        .returning(move || at(minute.fetch_add(1, Ordering::Relaxed)));
    Arc::new(clock)
}

/// Migrated, empty database, or `None` when no scratch database is configured.
async fn database() -> Option<Database> {
    let url = test_database_url()?;
    let guard = DATABASE_LOCK.lock().await;

    run_migrations(&url).await.expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(url.as_str()).with_max_size(2))
        .await
        .expect("pool builds");
    {
        let mut conn = pool.get().await.expect("connection checks out");
        diesel::sql_query("TRUNCATE phones, users")
            .execute(&mut conn)
            .await
            .expect("tables truncate");
    }

    Some(Database {
        store: DieselCredentialStore::new(pool.clone(), ticking_clock()),
        pool,
        _guard: guard,
    })
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Juan Rodriguez".to_owned(),
        email: email.to_owned(),
        password: PasswordDigest::new("pbkdf2-sha256$1$00$11"),
        is_active: true,
    }
}

fn new_phone(owner: &UserId, number: &str) -> NewPhone {
    NewPhone {
        user_id: owner.clone(),
        number: Some(number.to_owned()),
        city_code: Some("1".to_owned()),
        country_code: Some("57".to_owned()),
    }
}

fn numbers(user: &User) -> Vec<&str> {
    user.phones
        .iter()
        .filter_map(|phone| phone.number.as_deref())
        .collect()
}

fn listed<'a>(users: &'a [User], id: &UserId) -> &'a User {
    users
        .iter()
        .find(|user| user.id == *id)
        .expect("user is listed")
}

impl Database {
    async fn phone_rows(&self) -> i64 {
        let mut conn = self.pool.get().await.expect("connection checks out");
        diesel::sql_query("SELECT COUNT(*) AS count FROM phones")
            .get_result::<RowCount>(&mut conn)
            .await
            .expect("count query")
            .count
    }
}

#[rstest]
#[tokio::test]
async fn find_all_orders_users_and_groups_phones() {
    let Some(db) = database().await else {
        return;
    };
    let first = db
        .store
        .save_user(&new_user("zoe@example.cl"))
        .await
        .expect("first user");
    let second = db
        .store
        .save_user(&new_user("ana@example.cl"))
        .await
        .expect("second user");
    for (owner, number) in [(&second.id, "222"), (&first.id, "111"), (&first.id, "112")] {
        db.store
            .save_phone(&new_phone(owner, number))
            .await
            .expect("phone saved");
    }

    let users = db.store.find_all().await.expect("listing");

    let ids: Vec<&UserId> = users.iter().map(|user| &user.id).collect();
    assert_eq!(ids, vec![&first.id, &second.id]);
    assert_eq!(numbers(listed(&users, &first.id)), vec!["111", "112"]);
    assert_eq!(numbers(listed(&users, &second.id)), vec!["222"]);
    assert_eq!(db.store.find_all().await.expect("listing again"), users);
}

#[rstest]
#[tokio::test]
async fn find_by_email_is_exact_and_carries_phones() {
    let Some(db) = database().await else {
        return;
    };
    let user = db
        .store
        .save_user(&new_user("ana@example.cl"))
        .await
        .expect("user saved");
    db.store
        .save_phone(&new_phone(&user.id, "111"))
        .await
        .expect("phone saved");

    let found = db
        .store
        .find_by_email("ana@example.cl")
        .await
        .expect("lookup")
        .expect("user present");
    assert_eq!(found.id, user.id);
    assert_eq!(found.created, user.created);
    assert_eq!(found.last_login, found.created);
    assert_eq!(numbers(&found), vec!["111"]);

    let missing = db
        .store
        .find_by_email("ANA@example.cl")
        .await
        .expect("lookup");
    assert!(missing.is_none());
}

#[rstest]
#[tokio::test]
async fn email_constraint_maps_to_duplicate_email() {
    let Some(db) = database().await else {
        return;
    };
    db.store
        .save_user(&new_user("ana@example.cl"))
        .await
        .expect("first save");

    let error = db
        .store
        .save_user(&new_user("ana@example.cl"))
        .await
        .expect_err("second save fails");

    assert_eq!(error, CredentialStoreError::DuplicateEmail);
}

#[rstest]
#[tokio::test]
async fn phone_for_missing_owner_maps_to_unknown_owner() {
    let Some(db) = database().await else {
        return;
    };
    let stranger = UserId::random();

    let error = db
        .store
        .save_phone(&new_phone(&stranger, "111"))
        .await
        .expect_err("foreign key rejects");

    assert_eq!(
        error,
        CredentialStoreError::UnknownOwner {
            user_id: stranger.to_string()
        }
    );
}

#[rstest]
#[tokio::test]
async fn deleting_a_user_removes_their_phones() {
    let Some(db) = database().await else {
        return;
    };
    let user = db
        .store
        .save_user(&new_user("ana@example.cl"))
        .await
        .expect("user saved");
    db.store
        .save_phone(&new_phone(&user.id, "111"))
        .await
        .expect("phone saved");
    assert_eq!(db.phone_rows().await, 1);

    {
        let mut conn = db.pool.get().await.expect("connection checks out");
        diesel::sql_query("DELETE FROM users WHERE id = $1")
            .bind::<sql_types::Uuid, _>(*user.id.as_uuid())
            .execute(&mut conn)
            .await
            .expect("user deleted");
    }

    assert_eq!(db.phone_rows().await, 0);
}

#[rstest]
#[tokio::test]
async fn touch_last_login_refreshes_timestamps() {
    let Some(db) = database().await else {
        return;
    };
    let user = db
        .store
        .save_user(&new_user("ana@example.cl"))
        .await
        .expect("user saved");

    db.store
        .touch_last_login(&user.id)
        .await
        .expect("touched");

    let found = db
        .store
        .find_by_email("ana@example.cl")
        .await
        .expect("lookup")
        .expect("user present");
    assert_eq!(found.created, user.created);
    assert!(found.last_login > user.last_login);
    assert_eq!(found.modified, found.last_login);
}
