//! PBKDF2-HMAC-SHA256 password hasher.
//!
//! Digests are encoded as `pbkdf2-sha256$<rounds>$<salt hex>$<hash hex>` so
//! the round count travels with each stored value and can be raised without
//! invalidating older digests.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::RngCore;
use sha2::Sha256;
use tracing::debug;

use crate::domain::PasswordDigest;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Default PBKDF2 round count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Highest round count accepted when hashing or verifying.
pub const MAX_ITERATIONS: u32 = DEFAULT_ITERATIONS * 10;

/// Password hasher backed by PBKDF2 with a random per-password salt.
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2PasswordHasher {
    iterations: u32,
}

impl Default for Pbkdf2PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl Pbkdf2PasswordHasher {
    /// Create a hasher using `iterations` rounds for new digests, clamped to
    /// `1..=MAX_ITERATIONS`.
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.clamp(1, MAX_ITERATIONS),
        }
    }

    fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; KEY_LEN] {
        let mut key = [0_u8; KEY_LEN];
        pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, rounds, &mut key);
        key
    }
}

struct ParsedDigest {
    rounds: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

fn parse_digest(encoded: &str) -> Option<ParsedDigest> {
    let mut parts = encoded.split('$');
    let scheme = parts.next()?;
    let rounds = parts.next()?.parse().ok()?;
    let salt = hex::decode(parts.next()?).ok()?;
    let hash = hex::decode(parts.next()?).ok()?;
    if scheme != SCHEME || parts.next().is_some() || !(1..=MAX_ITERATIONS).contains(&rounds) {
        return None;
    }
    Some(ParsedDigest { rounds, salt, hash })
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (l, r)| acc | (l ^ r))
        == 0
}

impl PasswordHasher for Pbkdf2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng()
            .try_fill_bytes(&mut salt)
            .map_err(|err| PasswordHashError::derivation(err.to_string()))?;
        let key = Self::derive(password, &salt, self.iterations);
        Ok(PasswordDigest::new(format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(key)
        )))
    }

    fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        let Some(parsed) = parse_digest(digest.as_str()) else {
            debug!("stored password digest is not in the expected format");
            return false;
        };
        let key = Self::derive(password, &parsed.salt, parsed.rounds);
        constant_time_eq(&key, &parsed.hash)
    }
}
