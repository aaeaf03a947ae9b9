//! Domain types for the WBWS signal pipeline.

pub mod bar;
pub mod ids;

pub use bar::Bar;
pub use ids::{ConfigId, DatasetHash, RunId, SignalEventId};
