//! Durable model artifacts, one per train, next to the observation set so
//! the pair can be invalidated together.

use {
    crate::{config::model_artifact_filename, error::DelayError, model::TrainModel},
    std::{
        fs::File,
        io::{BufReader, BufWriter},
        path::Path,
    },
};

pub(crate) fn save_model_artifact(data_dir: &Path, model: &TrainModel) -> Result<(), DelayError> {
    let path = data_dir.join(model_artifact_filename(&model.train_id));
    let file = File::create(&path)?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, model)?;
    log::debug!(
        "MODEL IO: saved artifact for train {} to {}",
        model.train_id,
        path.display()
    );
    Ok(())
}

/// Loads a train's persisted model, or None when no artifact exists.
pub(crate) fn load_model_artifact(
    data_dir: &Path,
    train_id: &str,
) -> Result<Option<TrainModel>, DelayError> {
    let path = data_dir.join(model_artifact_filename(train_id));
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(&path)?;
    let reader = BufReader::new(file);
    let model = bincode::deserialize_from(reader)?;
    Ok(Some(model))
}
