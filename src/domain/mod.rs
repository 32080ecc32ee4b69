// Domain types and value objects
mod live;
mod observation;
mod route;

// Re-export commonly used types
pub use live::{LiveObservation, LiveStatus};
pub use observation::{DelayObservation, ObservationKey, RawDelayRecord};
pub(crate) use observation::weekday_index;
pub use route::{RouteStation, TrainRoute};
