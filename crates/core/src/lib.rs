//! Domain types and pure logic shared by the Wayfarer service and tooling.
//!
//! Nothing in this crate performs network I/O. The only filesystem access is
//! the per-user offline cache in [`offline`].

pub mod cough;
pub mod destinations;
pub mod devices;
pub mod error;
pub mod geo;
pub mod hashing;
pub mod history;
pub mod intent;
pub mod offline;
pub mod places;
pub mod types;
pub mod uploads;
