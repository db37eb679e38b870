//! Administrator credential hashing and verification
//!
//! Stored hashes have the form `sha256$<rounds>$<salt>$<digest>`, all hex.

use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;
use uuid::Uuid;

const SCHEME: &str = "sha256";

/// Stretching rounds used for newly created hashes
pub const DEFAULT_ROUNDS: u32 = 10_000;

/// Username/password pair presented to `unlock`
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn digest(salt: &str, password: &str, rounds: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut state = hasher.finalize();

    for _ in 1..rounds {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(state);
        state = hasher.finalize();
    }

    hex::encode(state)
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    hash_password_with(password, DEFAULT_ROUNDS)
}

/// Hash a password with an explicit number of rounds
pub fn hash_password_with(password: &str, rounds: u32) -> String {
    let rounds = rounds.max(1);
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}${}${}", SCHEME, rounds, salt, digest(&salt, password, rounds))
}

/// Check a password against a stored hash
///
/// Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(rounds), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if scheme != SCHEME {
        return false;
    }
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    if rounds == 0 {
        return false;
    }

    let actual = digest(salt, password, rounds);
    actual.as_bytes().ct_eq(expected.as_bytes()).into()
}
