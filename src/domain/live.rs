use {
    crate::config::DelayMinutes,
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumString},
};

/// Running state reported by the live-status scraper.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LiveStatus {
    /// Journey in progress; the delay refers to the train's current position.
    #[default]
    Pending,
    /// Journey finished. There is no "current delay" to reconcile against.
    /// A terminal state, not an error.
    Completed,
}

/// One live running-status reading for the train's current position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveObservation {
    pub station_code: String,
    pub observed_delay: DelayMinutes,
    pub status: LiveStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_parses_from_scraper_strings() {
        assert_eq!(LiveStatus::from_str("pending").unwrap(), LiveStatus::Pending);
        assert_eq!(
            LiveStatus::from_str("completed").unwrap(),
            LiveStatus::Completed
        );
        assert!(LiveStatus::from_str("derailed").is_err());
    }
}
