//! Argon2id hashing of device API keys.
//!
//! Keys are stored as PHC strings, so the salt and parameters travel with
//! the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash an API key with a random salt.
pub fn hash_api_key(api_key: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(api_key.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check an API key against a stored hash. A mismatch is `Ok(false)`.
pub fn verify_api_key(api_key: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(api_key.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_api_key("k3y").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_api_key("k3y", &hash).unwrap());
        assert!(!verify_api_key("other", &hash).unwrap());
    }

    #[test]
    fn same_key_hashes_differently() {
        assert_ne!(hash_api_key("k3y").unwrap(), hash_api_key("k3y").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_api_key("k3y", "not-a-phc-string").is_err());
    }
}
