//! Core pipeline for radiation-survey track maps.
//!
//! Track files are parsed into samples, merged into one dataset, filtered by
//! time, coloured over a user-adjustable value window and rendered into
//! self-contained HTML artifacts. Displaying or saving them is up to the caller.

pub mod ingest;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod render;
pub mod telemetry;

pub use ingest::{Metric, Sample};
pub use prelude::{TrackError, TrackResult};
pub use processing::Session;
