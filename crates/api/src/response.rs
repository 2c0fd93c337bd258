//! Shared response envelope types for API handlers.
//!
//! The demo endpoints answer with flat JSON objects. Listing endpoints that
//! read back logged activity use the `{ "data": ... }` envelope.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
