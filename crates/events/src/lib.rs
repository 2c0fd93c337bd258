//! Wayfarer activity event bus.
//!
//! - [`EventBus`] is an in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ActivityEvent`] describes something a user did through the API.
//! - [`EventPersistence`] is the background service that records every
//!   event in the matching log table.

pub mod bus;
pub mod persistence;

pub use bus::{ActivityEvent, EventBus};
pub use persistence::EventPersistence;
