//! Typed failure modes of the prediction pipeline.
//!
//! Every variant here is recoverable at the serving boundary; the binary maps
//! each one to a distinct user-facing status so "no data yet" is never
//! confused with "data insufficient" or "prediction unavailable".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DelayError {
    /// No historical observations exist at all for this train.
    /// Not retryable until the scraper delivers new data.
    #[error("no historical observations for train {train_id}")]
    UnknownTrain { train_id: String },

    /// Data exists but is below the training threshold.
    /// Retryable after more scraping.
    #[error(
        "insufficient history for train {train_id}: {have} distinct dates, need at least {need}"
    )]
    InsufficientHistory {
        train_id: String,
        have: usize,
        need: usize,
    },

    /// A station code was not found in the supplied route. This is an
    /// upstream data-matching defect (scraper vs schedule) and must be
    /// surfaced, never silently skipped.
    #[error("station {station_code} not present in the route of train {train_id}")]
    MissingRouteData {
        train_id: String,
        station_code: String,
    },

    /// Prediction was requested before any successful training.
    #[error("no trained model available for train {train_id}")]
    ModelUnavailable { train_id: String },

    /// A model trained under one feature schema was handed a vector built
    /// under another. Must never be applied silently; the caller has to
    /// retrain (or rebuild the vector) first.
    #[error(
        "model for train {train_id} was trained under feature schema v{model_version}, \
         got a vector built under v{vector_version}"
    )]
    SchemaMismatch {
        train_id: String,
        model_version: u32,
        vector_version: u32,
    },

    /// The per-train training lock could not be acquired in time.
    /// Retryable by the caller; the lock is released for the next attempt.
    #[error("training for train {train_id} did not complete within {waited_ms} ms")]
    TrainingTimeout { train_id: String, waited_ms: u128 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] bincode::Error),
}
