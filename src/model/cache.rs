//! Keyed model cache and trainer.
//!
//! One live entry per train_id. Training runs at most once per key at a
//! time: concurrent requests for the same train block on the first caller's
//! training run and then reuse its result, while requests for different
//! trains never contend on anything but a short-lived registry lock.

use {
    crate::{
        config::constants::{
            MAX_TRAINING_DELAY_MIN, MIN_TRAINING_DATES, RETRAIN_SAMPLE_DELTA,
            TRAINING_LOCK_TIMEOUT,
        },
        data::{load_model_artifact, save_model_artifact, ObservationStore},
        domain::TrainRoute,
        error::DelayError,
        features::FeatureBuilder,
        model::regressor::DelayRegressor,
    },
    chrono::{DateTime, Utc},
    itertools::Itertools,
    parking_lot::{Mutex, RwLock},
    serde::{Deserialize, Serialize},
    std::{
        collections::HashMap,
        path::PathBuf,
        sync::Arc,
        time::{Duration, Instant},
    },
};

/// A trained per-train model plus the metadata the cache needs to decide
/// whether it is still safe and fresh to serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainModel {
    pub train_id: String,
    pub feature_schema_version: u32,
    pub trained_at: DateTime<Utc>,
    /// Store observation count at training time; staleness is measured as
    /// the store's growth beyond this.
    pub training_sample_count: usize,
    pub regressor: DelayRegressor,
}

pub struct ModelCache {
    store: Arc<dyn ObservationStore>,
    builder: FeatureBuilder,
    data_dir: PathBuf,
    entries: RwLock<HashMap<String, Arc<TrainModel>>>,
    /// Per-train training locks. The outer mutex only guards the registry
    /// map and is held for map access, never across a training run.
    training_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    lock_timeout: Duration,
}

impl ModelCache {
    pub fn new(store: Arc<dyn ObservationStore>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            builder: FeatureBuilder::new(),
            data_dir: data_dir.into(),
            entries: RwLock::new(HashMap::new()),
            training_locks: Mutex::new(HashMap::new()),
            lock_timeout: TRAINING_LOCK_TIMEOUT,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_builder(mut self, builder: FeatureBuilder) -> Self {
        self.builder = builder;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    /// The cached model for a train, without triggering training.
    pub fn cached(&self, train_id: &str) -> Result<Arc<TrainModel>, DelayError> {
        self.entries
            .read()
            .get(train_id)
            .cloned()
            .ok_or_else(|| DelayError::ModelUnavailable {
                train_id: train_id.to_string(),
            })
    }

    /// Drops the cached entry and its durable artifact. The observation set
    /// keyed by the same id is left to the store.
    pub fn invalidate(&self, train_id: &str) -> Result<(), DelayError> {
        self.entries.write().remove(train_id);
        let path = self
            .data_dir
            .join(crate::config::model_artifact_filename(train_id));
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Returns a model that matches the current feature schema and is not
    /// stale, training one if necessary.
    pub fn get_or_train(&self, route: &TrainRoute) -> Result<Arc<TrainModel>, DelayError> {
        let train_id = route.train_id.as_str();

        // Fast path: no training lock taken when the entry is serveable.
        if let Some(entry) = self.fresh_entry(train_id) {
            return Ok(entry);
        }

        let key_lock = self.key_lock(train_id);
        let started = Instant::now();
        let _guard =
            key_lock
                .try_lock_for(self.lock_timeout)
                .ok_or_else(|| DelayError::TrainingTimeout {
                    train_id: train_id.to_string(),
                    waited_ms: started.elapsed().as_millis(),
                })?;

        // Double-check under the lock: the caller we queued behind may have
        // populated the cache for us.
        if let Some(entry) = self.fresh_entry(train_id) {
            log::debug!("CACHE [{}]: reusing model trained by concurrent caller", train_id);
            return Ok(entry);
        }

        // Cold cache: try the durable artifact before retraining from scratch.
        if !self.entries.read().contains_key(train_id) {
            if let Some(model) = load_model_artifact(&self.data_dir, train_id)? {
                let entry = Arc::new(model);
                if self.is_serveable(&entry) {
                    log::info!("CACHE [{}]: rehydrated model artifact from disk", train_id);
                    self.entries
                        .write()
                        .insert(train_id.to_string(), entry.clone());
                    return Ok(entry);
                }
                log::info!("CACHE [{}]: artifact on disk is stale or schema-mismatched", train_id);
            }
        }

        self.train(route)
    }

    fn key_lock(&self, train_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.training_locks.lock();
        locks
            .entry(train_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn fresh_entry(&self, train_id: &str) -> Option<Arc<TrainModel>> {
        let entries = self.entries.read();
        let entry = entries.get(train_id)?;
        self.is_serveable(entry).then(|| entry.clone())
    }

    /// Schema match plus staleness policy: retrain once the store has grown
    /// by `RETRAIN_SAMPLE_DELTA` observations since the entry was trained.
    fn is_serveable(&self, entry: &TrainModel) -> bool {
        if entry.feature_schema_version != self.builder.schema_version() {
            log::info!(
                "CACHE [{}]: schema v{} entry vs builder v{}, forcing retrain",
                entry.train_id,
                entry.feature_schema_version,
                self.builder.schema_version()
            );
            return false;
        }
        let current = self.store.observation_count(&entry.train_id);
        current.saturating_sub(entry.training_sample_count) < RETRAIN_SAMPLE_DELTA
    }

    /// Runs inside the per-key lock. On any failure no entry is created and
    /// the lock is released by the caller's guard, so a later call can retry.
    fn train(&self, route: &TrainRoute) -> Result<Arc<TrainModel>, DelayError> {
        let train_id = route.train_id.as_str();
        let observations = self.store.get_observations(train_id)?;

        let distinct_dates = observations
            .iter()
            .map(|o| o.observation_date)
            .dedup()
            .count();
        if distinct_dates < MIN_TRAINING_DATES {
            return Err(DelayError::InsufficientHistory {
                train_id: train_id.to_string(),
                have: distinct_dates,
                need: MIN_TRAINING_DATES,
            });
        }

        let mut rows = Vec::with_capacity(observations.len());
        let mut targets = Vec::with_capacity(observations.len());
        for (_date, group) in &observations.iter().chunk_by(|o| o.observation_date) {
            // Within one date the store orders by sequence_index, so the
            // carried-in delay is the previous element when contiguous.
            let day: Vec<_> = group.collect();
            for &obs in &day {
                if obs.observed_delay.value() > MAX_TRAINING_DELAY_MIN {
                    continue;
                }
                let upstream = day
                    .iter()
                    .find(|p| p.sequence_index + 1 == obs.sequence_index)
                    .copied();
                rows.push(self.builder.build_for_observation(route, obs, upstream)?);
                targets.push(obs.observed_delay.value());
            }
        }

        let (regressor, report) = DelayRegressor::fit(&rows, &targets);
        log::info!(
            "TRAINER [{}]: fit {} rows ({} dates) | MAE {:.2} min | RMSE {:.2} min",
            train_id,
            report.rows,
            distinct_dates,
            report.mae,
            report.rmse
        );

        let model = TrainModel {
            train_id: train_id.to_string(),
            feature_schema_version: self.builder.schema_version(),
            trained_at: Utc::now(),
            training_sample_count: observations.len(),
            regressor,
        };
        save_model_artifact(&self.data_dir, &model)?;

        let entry = Arc::new(model);
        // Atomic replacement: readers see either the old entry or this one.
        self.entries
            .write()
            .insert(train_id.to_string(), entry.clone());
        Ok(entry)
    }
}
