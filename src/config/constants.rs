//! Pipeline tuning constants (Immutable Blueprints)

use std::time::Duration;

/// Minimum number of distinct observation dates before a model may be trained.
pub const MIN_TRAINING_DATES: usize = 5;

/// A cached model is stale once this many observations have accumulated in
/// the store beyond the count it was trained on.
pub const RETRAIN_SAMPLE_DELTA: usize = 10;

/// A prediction is "reliable" when it lands within this many minutes of the
/// live-observed delay. Fixed design constant, not derived from data.
pub const RELIABILITY_TOLERANCE_MIN: f64 = 15.0;

/// Upper bound on how long a caller waits on another caller's in-flight
/// training run for the same train before giving up.
pub const TRAINING_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Observations with delays beyond this are dropped from the training set
/// as scraper noise (cancellations, rescheduled runs).
pub const MAX_TRAINING_DELAY_MIN: f64 = 120.0;

/// Small ridge term on the normal equations to keep the solve stable when
/// a feature column is near-constant (e.g. every run on the same weekday).
pub const RIDGE_LAMBDA: f64 = 1e-6;
