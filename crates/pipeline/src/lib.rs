//! Offline data-preparation jobs for the on-device cough and fall models.
//!
//! Every job is a linear batch run: read files, compute fixed-formula
//! features, write arrays to disk. The worker binary wires them to CLI
//! subcommands.

pub mod audio;
pub mod dataset;
pub mod error;
pub mod imu;
pub mod metrics;
pub mod mfcc;
pub mod motion;
pub mod quantize;
pub mod sorting;
pub mod split;

pub use error::PipelineError;
