//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: process-local `CredentialStore`
//! - **persistence**: PostgreSQL `CredentialStore` over Diesel
//! - **password**: PBKDF2-HMAC-SHA256 `PasswordHasher`
//! - **token**: HS256 JWT `TokenCodec`

pub mod memory;
pub mod password;
pub mod persistence;
pub mod token;

pub use memory::InMemoryCredentialStore;
pub use password::Pbkdf2PasswordHasher;
pub use token::JwtTokenCodec;
