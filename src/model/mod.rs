mod cache;
mod predictor;
mod reconcile;
mod regressor;

// Re-export commonly used types
pub use cache::{ModelCache, TrainModel};
pub use predictor::{predict, predict_route, PredictionResult};
pub use reconcile::{reconcile, ReconciliationResult};
pub use regressor::{DelayRegressor, FitReport};
