//! Credential encoding

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use mrfoods_config::PasswordStorage;

use crate::{AccountError, AccountResult};

/// Encode a new password according to the configured storage
pub fn encode_password(password: &str, storage: PasswordStorage) -> AccountResult<String> {
    match storage {
        PasswordStorage::Argon2 => hash_password(password),
        PasswordStorage::Plain => Ok(password.to_string()),
    }
}

/// Hash a password into an Argon2id PHC string
pub fn hash_password(password: &str) -> AccountResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::PasswordHash(e.to_string()))
}

/// Check a candidate against a stored credential in either encoding.
///
/// Anything that does not parse as a complete PHC hash is plain text,
/// whatever it starts with.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed_hash) if parsed_hash.hash.is_some() => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed_hash)
            .is_ok(),
        _ => stored == candidate,
    }
}
