//! Credential primitives
//!
//! # Passwords
//!
//! PBKDF2-HMAC-SHA256 with a random 16-byte salt, encoded as
//! `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>`. The iteration count
//! travels with the hash so it can be raised without invalidating old rows.
//!
//! # Session tokens
//!
//! 32 random bytes rendered as 64 hex chars. The database only ever sees the
//! SHA-256 of a token.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Minimum accepted password length (in characters)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Default PBKDF2 iteration count for new password hashes
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 200_000;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Stored password hash could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed password hash: {0}")]
pub struct PasswordHashError(pub String);

/// Hash a password for storage
///
/// # Examples
///
/// ```
/// use mboard_common::api::auth::{hash_password, verify_password};
///
/// let stored = hash_password("correct horse", 1_000);
/// assert!(stored.starts_with("pbkdf2-sha256$1000$"));
/// assert!(verify_password("correct horse", &stored).unwrap());
/// assert!(!verify_password("wrong horse", &stored).unwrap());
/// ```
pub fn hash_password(password: &str, iterations: u32) -> String {
    let iterations = iterations.max(1);
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt, iterations);
    format!(
        "{}${}${}${}",
        SCHEME,
        iterations,
        BASE64.encode(salt),
        BASE64.encode(key)
    )
}

/// Check a password against a stored hash
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordHashError> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(PasswordHashError("expected 4 '$'-separated fields".to_string()));
    };

    if scheme != SCHEME {
        return Err(PasswordHashError(format!("unknown scheme '{}'", scheme)));
    }
    let iterations: u32 = iterations
        .parse()
        .map_err(|e| PasswordHashError(format!("iterations: {}", e)))?;
    let salt = BASE64
        .decode(salt)
        .map_err(|e| PasswordHashError(format!("salt: {}", e)))?;
    let expected = BASE64
        .decode(hash)
        .map_err(|e| PasswordHashError(format!("hash: {}", e)))?;

    let actual = derive_key(password, &salt, iterations.max(1));
    Ok(bool::from(actual.as_slice().ct_eq(&expected)))
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// Generate a new random session token (64 hex chars)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// SHA-256 of a session token as 64 hex chars (the value stored in the database)
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Trim and lowercase an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose email shape check: `local@domain.tld` with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
