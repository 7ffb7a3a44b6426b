//! PostgreSQL persistence via Diesel.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module; callers only see the `CredentialStore` implementation, the
//! pool, and the migration runner.
//!
//! ```ignore
//! use accounts::outbound::persistence::{DbPool, DieselCredentialStore, PoolConfig};
//!
//! run_migrations(&url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let store = DieselCredentialStore::new(pool, Arc::new(DefaultClock));
//! ```

mod diesel_credential_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_credential_store::DieselCredentialStore;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
