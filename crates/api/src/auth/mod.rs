//! Device authentication primitives.
//!
//! - [`password`] -- Argon2id hashing and verification of device API keys.
//! - [`jwt`] -- JWT generation and validation for logged-in devices.

pub mod jwt;
pub mod password;
