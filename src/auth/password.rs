/// Password Hashing and Verification
///
/// Handles password hashing with Argon2id. The produced PHC string embeds
/// algorithm, parameters, and salt, so verification needs no external state.
/// Password strength policy lives in `validators`, not here; any plaintext
/// accepted by `hash_password` round-trips through `verify_password`.

use argon2::{
    password_hash::{rand_core::OsRng, Error as PasswordHashError, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};

use crate::error::HashError;

/// Hash a password using Argon2id with default cost parameters
///
/// # Arguments
/// * `password` - Plain text password to hash
///
/// # Errors
/// Returns error if hashing fails internally (salt generation, parameters)
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::HashingFailed(e.to_string()))
}

/// Verify a password against its stored hash
///
/// A mismatch is `Ok(false)`, not an error. An error means the stored hash
/// string itself could not be parsed or checked.
///
/// # Arguments
/// * `password` - Plain text password to verify
/// * `hash` - PHC hash string to verify against
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HashError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| HashError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(HashError::InvalidHash(e.to_string())),
    }
}
