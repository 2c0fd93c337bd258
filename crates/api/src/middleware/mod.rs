//! Request guards for the cough monitor routes.
//!
//! - [`auth::AuthDevice`] -- Extracts the logged-in device from a JWT Bearer token.
//! - [`rate_limit`] -- Per-client request budget.

pub mod auth;
pub mod rate_limit;
