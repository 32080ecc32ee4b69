use {
    anyhow::{Context, Result},
    clap::Parser,
    rail_delay::{
        Cli, DelayError, DelayPipeline, LiveObservation, RawDelayRecord, RouteStation, TrainRoute,
    },
    serde::Deserialize,
    std::{panic, path::Path},
    tabled::{Table, Tabled},
};

/// On-disk schedule document, as written by the schedule scraper.
#[derive(Debug, Deserialize)]
struct RouteDoc {
    train_id: String,
    stations: Vec<RouteStation>,
}

/// On-disk scraper batch: raw delay records for one train.
#[derive(Debug, Deserialize)]
struct IngestDoc {
    train_id: String,
    records: Vec<RawDelayRecord>,
}

#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Station")]
    station: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Predicted delay")]
    delay: String,
}

fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, global_level)
        .filter(Some("rail_delay"), my_code_level)
        .parse_default_env()
        .init();

    let args = Cli::parse();
    run(args)
}

fn run(args: Cli) -> Result<()> {
    let pipeline = DelayPipeline::new(&args.data_dir)
        .with_context(|| format!("opening data dir {}", args.data_dir.display()))?;

    let routes: Vec<TrainRoute> = args
        .routes
        .iter()
        .map(|path| load_route(path))
        .collect::<Result<_>>()?;

    if let Some(path) = &args.ingest {
        let doc: IngestDoc = load_json(path)?;
        let route = routes
            .iter()
            .find(|r| r.train_id == doc.train_id)
            .with_context(|| format!("no --route given for ingested train {}", doc.train_id))?;
        let appended = pipeline.ingest(route, doc.records)?;
        println!("Ingested {} new observations for train {}", appended, doc.train_id);
    }

    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    for (train_id, outcome) in pipeline.predict_fleet(&routes, date) {
        println!("\nTrain {} on {}:", train_id, date);
        match outcome {
            Ok(journey) => {
                let route = routes.iter().find(|r| r.train_id == train_id);
                let rows: Vec<PredictionRow> = journey
                    .iter()
                    .map(|p| PredictionRow {
                        station: route
                            .and_then(|r| r.station(&p.station_code))
                            .map(|s| s.station_name.clone())
                            .unwrap_or_default(),
                        code: p.station_code.clone(),
                        delay: p.predicted_delay.to_string(),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
            Err(err) => println!("  {}", describe(&err)),
        }
    }

    if let Some(path) = &args.live {
        let [route] = routes.as_slice() else {
            anyhow::bail!("--live requires exactly one --route");
        };
        let live: LiveObservation = load_json(path)?;
        match pipeline.reconcile_live(route, date, &live)? {
            Some(verdict) => {
                println!(
                    "\nLive at {}: observed {:.2} min vs predicted {:.2} min (off by {:.2}) -> {}",
                    live.station_code,
                    verdict.observed_delay_minutes,
                    verdict.predicted_delay_minutes,
                    verdict.absolute_difference,
                    if verdict.is_reliable {
                        "reliable"
                    } else {
                        "unreliable"
                    }
                );
            }
            None => println!("\nJourney completed; prediction-only output."),
        }
    }

    Ok(())
}

fn load_route(path: &Path) -> Result<TrainRoute> {
    let doc: RouteDoc = load_json(path)?;
    Ok(TrainRoute::new(doc.train_id, doc.stations))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// User-facing status per failure kind: "no data yet", "data insufficient"
/// and "prediction unavailable" must stay distinguishable.
fn describe(err: &DelayError) -> String {
    match err {
        DelayError::UnknownTrain { .. } => "no data found".to_string(),
        DelayError::InsufficientHistory { have, need, .. } => {
            format!("not enough history yet ({} of {} dates)", have, need)
        }
        DelayError::ModelUnavailable { .. } => "prediction unavailable".to_string(),
        other => other.to_string(),
    }
}
