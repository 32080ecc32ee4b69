//! Configuration module for the delay prediction pipeline.

mod persistence;
mod types;

// Public
pub mod constants;

// Re-export commonly used items
pub use persistence::{model_artifact_filename, observation_set_filename};
pub use types::DelayMinutes;
