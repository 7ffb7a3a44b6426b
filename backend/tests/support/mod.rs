//! Shared helpers for backend integration tests.
//!
//! Suites that need PostgreSQL read a scratch database URL from
//! `ACCOUNTS_TEST_DATABASE_URL`. Without it they print a skip marker and
//! return early so the rest of the suite still runs on machines without a
//! database.

/// Environment variable naming the scratch database for integration tests.
pub const TEST_DATABASE_URL_VAR: &str = "ACCOUNTS_TEST_DATABASE_URL";

/// Scratch database URL, or `None` after printing a skip marker.
#[expect(clippy::print_stderr, reason = "skip marker is read from test logs")]
pub fn test_database_url() -> Option<String> {
    match std::env::var(TEST_DATABASE_URL_VAR) {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP-TEST-DATABASE: set {TEST_DATABASE_URL_VAR} to run");
            None
        }
    }
}
