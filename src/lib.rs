// Core modules
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
mod utils;

// Re-export commonly used types outside of crate
pub use config::DelayMinutes;
pub use domain::{LiveObservation, LiveStatus, RawDelayRecord, RouteStation, TrainRoute};
pub use error::DelayError;
pub use features::{FeatureBuilder, FeatureVector, FEATURE_SCHEMA_VERSION};
pub use model::{PredictionResult, ReconciliationResult, TrainModel};
pub use pipeline::DelayPipeline;

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding per-train observation sets and model artifacts
    #[arg(long, default_value = "pipeline_output")]
    pub data_dir: PathBuf,

    /// JSON schedule file(s), one ordered route per file; repeat for a fleet sweep
    #[arg(long = "route", required = true, num_args = 1..)]
    pub routes: Vec<PathBuf>,

    /// Journey date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,

    /// JSON file of raw scraped delay records to ingest before predicting
    #[arg(long)]
    pub ingest: Option<PathBuf>,

    /// JSON file with one live running-status observation to reconcile
    /// against (single-route runs only)
    #[arg(long)]
    pub live: Option<PathBuf>,
}
