//! File persistence and serialization configuration
//!
//! Both artifact kinds are keyed by the same train identifier so the pair
//! can be invalidated together.

/// Current version of the on-disk serialization format. Bump on any change
/// to the persisted record shapes.
pub const FORMAT_VERSION: u32 = 1;

/// Filename for a train's durable observation set.
/// Example: "12303_v1.obs.bin"
pub fn observation_set_filename(train_id: &str) -> String {
    format!("{}_v{}.obs.bin", train_id, FORMAT_VERSION)
}

/// Filename for a train's current serialized model artifact.
/// Example: "12303_v1.model.bin"
pub fn model_artifact_filename(train_id: &str) -> String {
    format!("{}_v{}.model.bin", train_id, FORMAT_VERSION)
}
