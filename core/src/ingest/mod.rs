pub mod sample;
pub mod track;

pub use sample::{Metric, Sample};
pub use track::{ParsedTrack, TrackParser};
