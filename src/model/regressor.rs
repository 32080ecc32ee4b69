//! The per-train delay regressor.
//!
//! A ridge-damped least-squares linear model over the delay feature vector.
//! The feature set is low-cardinality integers plus one delay value, so no
//! scaling is applied; what matters is that the encoding is byte-identical
//! between training and inference, which the shared [`FeatureBuilder`]
//! guarantees.
//!
//! [`FeatureBuilder`]: crate::features::FeatureBuilder

use {
    crate::{
        config::constants::RIDGE_LAMBDA,
        features::{FeatureVector, FEATURE_DIM},
        utils::solve_linear_system,
    },
    serde::{Deserialize, Serialize},
    statrs::statistics::Statistics,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayRegressor {
    weights: Vec<f64>,
    intercept: f64,
}

/// Training-set error metrics, logged after every fit.
#[derive(Debug, Clone, Copy)]
pub struct FitReport {
    pub mae: f64,
    pub rmse: f64,
    pub rows: usize,
}

impl DelayRegressor {
    /// Fits against `targets` (observed delays, minutes) by minimizing mean
    /// squared error via the normal equations. Falls back to an
    /// intercept-only mean model if the solve degenerates.
    pub fn fit(rows: &[FeatureVector], targets: &[f64]) -> (Self, FitReport) {
        debug_assert_eq!(rows.len(), targets.len());
        let n = rows.len();
        let dim = FEATURE_DIM + 1; // +1 intercept column

        // Accumulate X^T X and X^T y with an implicit leading 1.0 column.
        let mut xtx = vec![vec![0.0f64; dim]; dim];
        let mut xty = vec![0.0f64; dim];
        for (row, &y) in rows.iter().zip(targets) {
            let mut x = [0.0f64; FEATURE_DIM + 1];
            x[0] = 1.0;
            x[1..].copy_from_slice(row.values());
            for i in 0..dim {
                for j in 0..dim {
                    xtx[i][j] += x[i] * x[j];
                }
                xty[i] += x[i] * y;
            }
        }
        for (i, diag_row) in xtx.iter_mut().enumerate() {
            diag_row[i] += RIDGE_LAMBDA;
        }

        let model = match solve_linear_system(xtx, xty) {
            Some(solution) => Self {
                intercept: solution[0],
                weights: solution[1..].to_vec(),
            },
            None => {
                log::warn!("REGRESSOR: degenerate normal equations, using mean-delay fallback");
                let mean = if n == 0 {
                    0.0
                } else {
                    targets.iter().copied().mean()
                };
                Self {
                    intercept: mean,
                    weights: vec![0.0; FEATURE_DIM],
                }
            }
        };

        let residuals: Vec<f64> = rows
            .iter()
            .zip(targets)
            .map(|(row, &y)| model.predict_raw(row) - y)
            .collect();
        let report = if n == 0 {
            FitReport {
                mae: 0.0,
                rmse: 0.0,
                rows: 0,
            }
        } else {
            FitReport {
                mae: residuals.iter().map(|r| r.abs()).mean(),
                rmse: residuals.iter().map(|r| r * r).mean().sqrt(),
                rows: n,
            }
        };

        (model, report)
    }

    /// Hand-built model for tests that need exact, known coefficients.
    #[cfg(test)]
    pub(crate) fn from_parts(weights: Vec<f64>, intercept: f64) -> Self {
        debug_assert_eq!(weights.len(), FEATURE_DIM);
        Self { weights, intercept }
    }

    /// Raw model output in minutes. May be negative; the predictor clamps.
    pub fn predict_raw(&self, vector: &FeatureVector) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(vector.values())
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}
