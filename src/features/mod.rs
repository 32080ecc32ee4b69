//! Feature construction shared by training and inference.
//!
//! One code path builds vectors for both, which is what keeps the model free
//! of training/serving skew: if the encoding changes, it changes for both
//! sides at once and the schema version below is bumped, forcing every
//! cached model to retrain before it sees a new-schema vector.

use {
    crate::{
        config::DelayMinutes,
        domain::{DelayObservation, TrainRoute},
        error::DelayError,
    },
    chrono::{Datelike, NaiveDate},
    serde::{Deserialize, Serialize},
};

/// Identifier for the exact set/order/encoding of features below.
/// Any addition, removal or reordering bumps this.
pub const FEATURE_SCHEMA_VERSION: u32 = 2;

/// Ordered feature names, the serving-side contract of the schema.
pub const FEATURE_NAMES: [&str; 5] = [
    "sequence_index",
    "day_of_week",
    "month",
    "days_since_epoch",
    "upstream_cumulative_delay",
];

pub const FEATURE_DIM: usize = FEATURE_NAMES.len();

/// A numeric feature vector plus the identifying context it was built from.
/// Derived, never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub train_id: String,
    pub station_code: String,
    pub date: NaiveDate,
    pub schema_version: u32,
    values: [f64; FEATURE_DIM],
}

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn upstream_delay(&self) -> f64 {
        self.values[4]
    }
}

/// Pure, deterministic transform from (station, date, upstream delay) into a
/// [`FeatureVector`]. Stateless apart from the schema version it stamps onto
/// every vector it produces.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    version: u32,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBuilder {
    pub fn new() -> Self {
        Self {
            version: FEATURE_SCHEMA_VERSION,
        }
    }

    /// Builder stamping an arbitrary schema version. Only meaningful in
    /// tests that exercise the schema-mismatch retraining path.
    #[cfg(test)]
    pub(crate) fn with_version(version: u32) -> Self {
        Self { version }
    }

    pub fn schema_version(&self) -> u32 {
        self.version
    }

    /// Builds the vector for one station/date.
    ///
    /// `upstream` is the delay carried into this station: the immediately
    /// preceding station's observed delay during training, or its predicted
    /// delay during forward prediction. It is forced to 0 at the source
    /// regardless of what the caller passes.
    pub fn build(
        &self,
        route: &TrainRoute,
        station_code: &str,
        date: NaiveDate,
        upstream: DelayMinutes,
    ) -> Result<FeatureVector, DelayError> {
        let station = route
            .station(station_code)
            .ok_or_else(|| DelayError::MissingRouteData {
                train_id: route.train_id.clone(),
                station_code: station_code.to_string(),
            })?;

        let upstream = if station.is_source {
            DelayMinutes::ZERO
        } else {
            upstream
        };

        let values = [
            station.sequence_index as f64,
            date.weekday().num_days_from_monday() as f64,
            date.month() as f64,
            days_since_epoch(date) as f64,
            upstream.value(),
        ];

        Ok(FeatureVector {
            train_id: route.train_id.clone(),
            station_code: station_code.to_string(),
            date,
            schema_version: self.version,
            values,
        })
    }

    /// Training-side entry point: builds the vector for a stored observation,
    /// given the same-date observation at the previous station (None at the
    /// source, or when that date has a gap in the scrape).
    pub fn build_for_observation(
        &self,
        route: &TrainRoute,
        observation: &DelayObservation,
        upstream: Option<&DelayObservation>,
    ) -> Result<FeatureVector, DelayError> {
        let carried = upstream
            .map(|prev| prev.observed_delay)
            .unwrap_or(DelayMinutes::ZERO);
        self.build(
            route,
            &observation.station_code,
            observation.observation_date,
            carried,
        )
    }
}

/// Monotonic ordinal date feature: whole days since 1970-01-01.
fn days_since_epoch(date: NaiveDate) -> i64 {
    date.signed_duration_since(NaiveDate::default()).num_days()
}
