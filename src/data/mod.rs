mod model_io;
mod observation_store;

pub use observation_store::{FileObservationStore, ObservationStore};

pub(crate) use model_io::{load_model_artifact, save_model_artifact};
