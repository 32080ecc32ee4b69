//! Serving façade: wires the store, cache, predictor and reconciler into the
//! per-request entry points the transport layer calls.

use {
    crate::{
        data::{FileObservationStore, ObservationStore},
        domain::{LiveObservation, LiveStatus, RawDelayRecord, TrainRoute},
        error::DelayError,
        model::{predict_route, reconcile, ModelCache, PredictionResult, ReconciliationResult},
    },
    chrono::NaiveDate,
    rayon::prelude::*,
    std::{path::Path, sync::Arc},
};

pub struct DelayPipeline {
    store: Arc<FileObservationStore>,
    cache: ModelCache,
}

impl DelayPipeline {
    /// All durable state (observation sets and model artifacts) lives under
    /// `data_dir`, keyed per train.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, DelayError> {
        let data_dir = data_dir.as_ref();
        let store = Arc::new(FileObservationStore::new(data_dir)?);
        let cache = ModelCache::new(store.clone(), data_dir);
        Ok(Self { store, cache })
    }

    pub fn store(&self) -> &dyn ObservationStore {
        self.store.as_ref()
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Ingests a scraper batch for one train. Returns records appended.
    pub fn ingest(
        &self,
        route: &TrainRoute,
        records: Vec<RawDelayRecord>,
    ) -> Result<usize, DelayError> {
        self.store.ingest(route, records)
    }

    /// Whole-route prediction for one journey date, training or refreshing
    /// the train's model first when needed.
    pub fn predict_journey(
        &self,
        route: &TrainRoute,
        date: NaiveDate,
    ) -> Result<Vec<PredictionResult>, DelayError> {
        let model = self.cache.get_or_train(route)?;
        predict_route(&model, self.cache.builder(), route, date)
    }

    /// Prediction for a single station. Forward-chaining makes every
    /// station's feature depend on its predecessors, so this runs the full
    /// route walk and picks one stop out of it.
    pub fn predict_station(
        &self,
        route: &TrainRoute,
        station_code: &str,
        date: NaiveDate,
    ) -> Result<PredictionResult, DelayError> {
        let journey = self.predict_journey(route, date)?;
        journey
            .into_iter()
            .find(|p| p.station_code == station_code)
            .ok_or_else(|| DelayError::MissingRouteData {
                train_id: route.train_id.clone(),
                station_code: station_code.to_string(),
            })
    }

    /// Reconciles the prediction for the train's current position against a
    /// live observation. `Ok(None)` when the journey is reported completed:
    /// there is no current delay, so the caller surfaces prediction-only
    /// output.
    pub fn reconcile_live(
        &self,
        route: &TrainRoute,
        date: NaiveDate,
        live: &LiveObservation,
    ) -> Result<Option<ReconciliationResult>, DelayError> {
        if live.status == LiveStatus::Completed {
            log::debug!(
                "RECONCILE [{}]: journey completed, skipping",
                route.train_id
            );
            return Ok(None);
        }
        let prediction = self.predict_station(route, &live.station_code, date)?;
        Ok(Some(reconcile(
            prediction.predicted_delay,
            live.observed_delay,
        )))
    }

    /// Sweeps a set of trains for one date in parallel. Per-key locking in
    /// the cache means the sweeps never serialize behind each other; each
    /// train's outcome is reported independently so one failing train does
    /// not sink the batch.
    pub fn predict_fleet(
        &self,
        routes: &[TrainRoute],
        date: NaiveDate,
    ) -> Vec<(String, Result<Vec<PredictionResult>, DelayError>)> {
        routes
            .par_iter()
            .map(|route| (route.train_id.clone(), self.predict_journey(route, date)))
            .collect()
    }
}
