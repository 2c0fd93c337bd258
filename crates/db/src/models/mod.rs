//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts where the table accepts writes

pub mod cough_event;
pub mod destination;
pub mod device;
pub mod image_search;
pub mod offline_data;
pub mod user;
pub mod voice_command;
