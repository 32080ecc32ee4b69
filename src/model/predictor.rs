//! Applies a cached model to feature vectors.

use {
    crate::{
        config::DelayMinutes,
        domain::TrainRoute,
        error::DelayError,
        features::{FeatureBuilder, FeatureVector},
        model::cache::TrainModel,
    },
    chrono::NaiveDate,
    serde::{Deserialize, Serialize},
};

/// A single station's predicted delay. Transient, recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub train_id: String,
    pub station_code: String,
    pub date: NaiveDate,
    /// Rounded to 2 decimals, clamped to >= 0.
    pub predicted_delay: DelayMinutes,
}

/// Runs the regressor over one vector. Raw output is rounded to two
/// decimals and clamped to non-negative. A vector built under a different
/// feature schema than the model's is rejected outright; `SchemaMismatch`
/// tells the caller to retrain before applying.
pub fn predict(model: &TrainModel, vector: &FeatureVector) -> Result<PredictionResult, DelayError> {
    if model.feature_schema_version != vector.schema_version {
        return Err(DelayError::SchemaMismatch {
            train_id: model.train_id.clone(),
            model_version: model.feature_schema_version,
            vector_version: vector.schema_version,
        });
    }
    let raw = model.regressor.predict_raw(vector);
    Ok(PredictionResult {
        train_id: vector.train_id.clone(),
        station_code: vector.station_code.clone(),
        date: vector.date,
        predicted_delay: DelayMinutes::new(raw).rounded(),
    })
}

/// Predicts every station of a route for one journey date, in sequence
/// order, feeding each station's prediction forward as the next station's
/// upstream delay. True upstream delay is unknown for a future journey, so
/// the model's own prior output substitutes for it; this forward-chaining is
/// deliberate and is where error compounds over long routes.
pub fn predict_route(
    model: &TrainModel,
    builder: &FeatureBuilder,
    route: &TrainRoute,
    date: NaiveDate,
) -> Result<Vec<PredictionResult>, DelayError> {
    let mut results = Vec::with_capacity(route.len());
    let mut carried = DelayMinutes::ZERO;

    for station in route.stations() {
        let vector = builder.build(route, &station.station_code, date, carried)?;
        let prediction = predict(model, &vector)?;
        carried = prediction.predicted_delay;
        results.push(prediction);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::RouteStation,
        features::{FEATURE_SCHEMA_VERSION, FEATURE_DIM},
        model::regressor::DelayRegressor,
    };
    use chrono::Utc;

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

    /// Model with known coefficients: delay = 2 + 10*seq + 1*upstream.
    fn synthetic_model(train_id: &str) -> TrainModel {
        let mut weights = vec![0.0; FEATURE_DIM];
        weights[0] = 10.0; // sequence_index
        weights[4] = 1.0; // upstream_cumulative_delay
        TrainModel {
            train_id: train_id.to_string(),
            feature_schema_version: FEATURE_SCHEMA_VERSION,
            trained_at: Utc::now(),
            training_sample_count: 0,
            regressor: DelayRegressor::from_parts(weights, 2.0),
        }
    }

    #[test]
    fn route_walk_chains_the_previous_stations_prediction() {
        let route = TrainRoute::new("t", vec![stop("A", 0), stop("B", 1), stop("C", 2)]);
        let model = synthetic_model("t");
        let builder = FeatureBuilder::new();
        let date = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();

        let journey = predict_route(&model, &builder, &route, date).unwrap();
        let delays: Vec<f64> = journey.iter().map(|p| p.predicted_delay.value()).collect();

        // A: 2 + 0 + 0. B: 2 + 10 + A's prediction (2) = 14.
        // C: 2 + 20 + B's prediction (14) = 36. The carried-in value is the
        // immediately preceding station's prediction, not the running sum
        // over all predecessors (that would give 38).
        assert_eq!(delays, vec![2.0, 14.0, 36.0]);
    }

    #[test]
    fn negative_raw_output_clamps_to_zero_and_stays_clamped_downstream() {
        let route = TrainRoute::new("t", vec![stop("A", 0), stop("B", 1)]);
        let mut weights = vec![0.0; FEATURE_DIM];
        weights[4] = 1.0;
        let model = TrainModel {
            train_id: "t".to_string(),
            feature_schema_version: FEATURE_SCHEMA_VERSION,
            trained_at: Utc::now(),
            training_sample_count: 0,
            regressor: DelayRegressor::from_parts(weights, -7.0),
        };
        let date = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();

        let journey = predict_route(&model, &FeatureBuilder::new(), &route, date).unwrap();
        // Raw -7 at the source clamps to 0; B then sees upstream 0, not -7.
        assert_eq!(journey[0].predicted_delay.value(), 0.0);
        assert_eq!(journey[1].predicted_delay.value(), 0.0);
    }

    #[test]
    fn mismatched_feature_schema_is_rejected() {
        let route = TrainRoute::new("t", vec![stop("A", 0)]);
        let model = synthetic_model("t");
        let stale_builder = FeatureBuilder::with_version(FEATURE_SCHEMA_VERSION - 1);
        let date = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();

        let vector = stale_builder
            .build(&route, "A", date, DelayMinutes::ZERO)
            .unwrap();
        let err = predict(&model, &vector).unwrap_err();
        assert!(matches!(
            err,
            DelayError::SchemaMismatch {
                vector_version, ..
            } if vector_version == FEATURE_SCHEMA_VERSION - 1
        ));

        // And the route walk refuses the same pairing.
        assert!(predict_route(&model, &stale_builder, &route, date).is_err());
    }

    #[test]
    fn rounding_is_two_decimals() {
        let route = TrainRoute::new("t", vec![stop("A", 0)]);
        let mut weights = vec![0.0; FEATURE_DIM];
        weights[0] = 0.0;
        let model = TrainModel {
            train_id: "t".to_string(),
            feature_schema_version: FEATURE_SCHEMA_VERSION,
            trained_at: Utc::now(),
            training_sample_count: 0,
            regressor: DelayRegressor::from_parts(weights, 17.1284),
        };
        let date = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();
        let journey = predict_route(&model, &FeatureBuilder::new(), &route, date).unwrap();
        assert_eq!(journey[0].predicted_delay.value(), 17.13);
    }
}
