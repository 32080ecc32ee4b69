//! Canonical persisted delay history, one record set per train.

use {
    crate::{
        config::{constants::MIN_TRAINING_DATES, observation_set_filename, DelayMinutes},
        domain::{DelayObservation, ObservationKey, RawDelayRecord, TrainRoute},
        error::DelayError,
    },
    parking_lot::RwLock,
    std::{
        collections::{HashMap, HashSet},
        fs::File,
        io::{BufReader, BufWriter},
        path::{Path, PathBuf},
    },
};

/// Abstract interface over the historical delay store, the seam between the
/// scraping collaborators and the trainer.
pub trait ObservationStore: Send + Sync {
    /// All observations for a train, ordered by (date, sequence_index).
    /// `UnknownTrain` when the store holds nothing at all for the id.
    fn get_observations(&self, train_id: &str) -> Result<Vec<DelayObservation>, DelayError>;

    /// Total stored observations for a train (0 when unknown).
    fn observation_count(&self, train_id: &str) -> usize;

    /// Number of distinct observation dates for a train.
    fn distinct_dates(&self, train_id: &str) -> usize;

    fn has_sufficient_history(&self, train_id: &str) -> bool {
        self.distinct_dates(train_id) >= MIN_TRAINING_DATES
    }

    /// Appends deduplicated records. Existing observations are never
    /// overwritten; the store is append-only for audit integrity.
    /// Returns the number of records actually appended.
    fn ingest(
        &self,
        route: &TrainRoute,
        records: Vec<RawDelayRecord>,
    ) -> Result<usize, DelayError>;
}

struct TrainHistory {
    observations: Vec<DelayObservation>,
    keys: HashSet<ObservationKey>,
}

impl TrainHistory {
    fn from_observations(observations: Vec<DelayObservation>) -> Self {
        let keys = observations.iter().map(|o| o.key()).collect();
        Self { observations, keys }
    }
}

/// Durable store backed by one bincode file per train under `data_dir`.
/// Histories are loaded lazily and kept in memory behind a single RwLock;
/// the append path is exclusive, so concurrent ingests from multiple
/// scrapers dedup cleanly.
pub struct FileObservationStore {
    data_dir: PathBuf,
    trains: RwLock<HashMap<String, TrainHistory>>,
}

impl FileObservationStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, DelayError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            trains: RwLock::new(HashMap::new()),
        })
    }

    fn observation_path(&self, train_id: &str) -> PathBuf {
        self.data_dir.join(observation_set_filename(train_id))
    }

    /// Loads a train's history from disk into the map if not yet resident.
    fn ensure_loaded(&self, train_id: &str) -> Result<(), DelayError> {
        if self.trains.read().contains_key(train_id) {
            return Ok(());
        }

        let path = self.observation_path(train_id);
        if !path.exists() {
            return Ok(());
        }

        let observations = read_observation_file(&path)?;
        log::debug!(
            "STORE: loaded {} observations for train {} from {}",
            observations.len(),
            train_id,
            path.display()
        );

        let mut trains = self.trains.write();
        // A concurrent loader may have won the race; keep its copy.
        trains
            .entry(train_id.to_string())
            .or_insert_with(|| TrainHistory::from_observations(observations));
        Ok(())
    }

    fn persist(&self, train_id: &str, observations: &[DelayObservation]) -> Result<(), DelayError> {
        let path = self.observation_path(train_id);
        let file = File::create(&path)?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, observations)?;
        Ok(())
    }
}

impl ObservationStore for FileObservationStore {
    fn get_observations(&self, train_id: &str) -> Result<Vec<DelayObservation>, DelayError> {
        self.ensure_loaded(train_id)?;
        let trains = self.trains.read();
        match trains.get(train_id) {
            Some(history) if !history.observations.is_empty() => Ok(history.observations.clone()),
            _ => Err(DelayError::UnknownTrain {
                train_id: train_id.to_string(),
            }),
        }
    }

    fn observation_count(&self, train_id: &str) -> usize {
        if self.ensure_loaded(train_id).is_err() {
            return 0;
        }
        self.trains
            .read()
            .get(train_id)
            .map(|h| h.observations.len())
            .unwrap_or(0)
    }

    fn distinct_dates(&self, train_id: &str) -> usize {
        if self.ensure_loaded(train_id).is_err() {
            return 0;
        }
        self.trains
            .read()
            .get(train_id)
            .map(|h| {
                h.observations
                    .iter()
                    .map(|o| o.observation_date)
                    .collect::<HashSet<_>>()
                    .len()
            })
            .unwrap_or(0)
    }

    fn ingest(
        &self,
        route: &TrainRoute,
        records: Vec<RawDelayRecord>,
    ) -> Result<usize, DelayError> {
        let train_id = route.train_id.as_str();
        self.ensure_loaded(train_id)?;

        // Stage the whole batch before touching the history: station codes
        // are resolved against the route table (never by free-text name),
        // and an unknown code is an upstream data-matching defect that must
        // surface with nothing applied. Memory and disk stay in lockstep.
        let mut staged = Vec::with_capacity(records.len());
        for record in records {
            let station = route.station(&record.station_code).ok_or_else(|| {
                DelayError::MissingRouteData {
                    train_id: train_id.to_string(),
                    station_code: record.station_code.clone(),
                }
            })?;

            staged.push(DelayObservation {
                train_id: train_id.to_string(),
                station_code: record.station_code,
                scheduled_time: station.scheduled_arrival,
                observed_delay: DelayMinutes::new(record.delay_minutes),
                observation_date: record.date,
                day_of_week: crate::domain::weekday_index(record.date),
                sequence_index: station.sequence_index,
            });
        }

        let mut trains = self.trains.write();
        let history = trains
            .entry(train_id.to_string())
            .or_insert_with(|| TrainHistory::from_observations(Vec::new()));

        let mut appended = 0usize;
        let mut skipped = 0usize;

        for observation in staged {
            let key = observation.key();
            if history.keys.contains(&key) {
                skipped += 1;
                continue;
            }
            history.observations.push(observation);
            history.keys.insert(key);
            appended += 1;
        }

        if appended > 0 {
            history
                .observations
                .sort_by(|a, b| (a.observation_date, a.sequence_index)
                    .cmp(&(b.observation_date, b.sequence_index)));
            self.persist(train_id, &history.observations)?;
        }

        if skipped > 0 {
            log::debug!(
                "STORE: skipped {} duplicate records for train {}",
                skipped,
                train_id
            );
        }
        log::info!(
            "STORE: appended {} observations for train {} (total {})",
            appended,
            train_id,
            history.observations.len()
        );

        Ok(appended)
    }
}

fn read_observation_file(path: &Path) -> Result<Vec<DelayObservation>, DelayError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(bincode::deserialize_from(reader)?)
}
