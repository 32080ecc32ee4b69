use {
    crate::config::DelayMinutes,
    chrono::{Datelike, NaiveDate, NaiveTime},
    serde::{Deserialize, Serialize},
};

/// Identity key for a stored observation. The store keeps exactly one record
/// per key, forever; re-ingesting the same key never overwrites the delay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationKey {
    pub train_id: String,
    pub station_code: String,
    pub observation_date: NaiveDate,
}

/// One historical delay reading for one station on one date.
/// Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayObservation {
    pub train_id: String,
    pub station_code: String,
    pub scheduled_time: Option<NaiveTime>,
    pub observed_delay: DelayMinutes,
    pub observation_date: NaiveDate,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u8,
    /// Position of the station along the route, 0 at the source.
    pub sequence_index: usize,
}

impl DelayObservation {
    pub fn key(&self) -> ObservationKey {
        ObservationKey {
            train_id: self.train_id.clone(),
            station_code: self.station_code.clone(),
            observation_date: self.observation_date,
        }
    }
}

/// Raw record as delivered by the history scraper. Untrusted: the delay may
/// be negative (early arrival) or absurd (cancelled run) and is clamped or
/// filtered before it ever reaches a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDelayRecord {
    pub station_code: String,
    pub date: NaiveDate,
    pub delay_minutes: f64,
}

/// Monday-based weekday index, matching the encoding models are trained on.
pub(crate) fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}
