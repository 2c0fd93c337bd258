//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async data access
//! methods that accept `&SqlitePool` as the first argument.

pub mod cough_event_repo;
pub mod destination_repo;
pub mod device_repo;
pub mod image_search_repo;
pub mod offline_data_repo;
pub mod user_repo;
pub mod voice_command_repo;

pub use cough_event_repo::CoughEventRepo;
pub use destination_repo::DestinationRepo;
pub use device_repo::DeviceRepo;
pub use image_search_repo::ImageSearchRepo;
pub use offline_data_repo::OfflineDataRepo;
pub use user_repo::UserRepo;
pub use voice_command_repo::VoiceCommandRepo;
