use {
    chrono::NaiveTime,
    serde::{Deserialize, Serialize},
};

/// One stop on a train's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStation {
    pub station_code: String,
    pub station_name: String,
    pub sequence_index: usize,
    pub scheduled_arrival: Option<NaiveTime>,
    pub scheduled_departure: Option<NaiveTime>,
    #[serde(default)]
    pub is_source: bool,
    #[serde(default)]
    pub is_destination: bool,
}

/// The ordered sequence of stations a train serves, source to destination.
///
/// Ordering by `sequence_index` is total and gapless: `new` sorts whatever
/// the schedule provider delivered and reindexes from 0, then flags the
/// first and last stops. All lookups are by station *code*; free-text
/// station names from the scraper are never used for matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRoute {
    pub train_id: String,
    stations: Vec<RouteStation>,
}

impl TrainRoute {
    pub fn new(train_id: impl Into<String>, mut stations: Vec<RouteStation>) -> Self {
        stations.sort_by_key(|s| s.sequence_index);
        let last = stations.len().saturating_sub(1);
        for (idx, station) in stations.iter_mut().enumerate() {
            station.sequence_index = idx;
            station.is_source = idx == 0;
            station.is_destination = idx == last;
        }
        Self {
            train_id: train_id.into(),
            stations,
        }
    }

    pub fn stations(&self) -> &[RouteStation] {
        &self.stations
    }

    pub fn station(&self, station_code: &str) -> Option<&RouteStation> {
        self.stations
            .iter()
            .find(|s| s.station_code == station_code)
    }

    pub fn position_of(&self, station_code: &str) -> Option<usize> {
        self.station(station_code).map(|s| s.sequence_index)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(code: &str, seq: usize) -> RouteStation {
        RouteStation {
            station_code: code.to_string(),
            station_name: code.to_string(),
            sequence_index: seq,
            scheduled_arrival: None,
            scheduled_departure: None,
            is_source: false,
            is_destination: false,
        }
    }

    #[test]
    fn route_is_reindexed_gapless_and_flagged() {
        // Schedule providers sometimes deliver sparse or shuffled indexes.
        let route = TrainRoute::new("12303", vec![stop("NDLS", 30), stop("HWH", 0), stop("CNB", 7)]);

        let codes: Vec<&str> = route
            .stations()
            .iter()
            .map(|s| s.station_code.as_str())
            .collect();
        assert_eq!(codes, ["HWH", "CNB", "NDLS"]);
        assert_eq!(route.position_of("CNB"), Some(1));
        assert!(route.stations()[0].is_source);
        assert!(route.stations()[2].is_destination);
        assert!(!route.stations()[1].is_source);
    }

    #[test]
    fn unknown_code_has_no_position() {
        let route = TrainRoute::new("12303", vec![stop("HWH", 0), stop("NDLS", 1)]);
        assert_eq!(route.position_of("BWN"), None);
    }
}
