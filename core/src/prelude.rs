use crate::ingest::{Metric, Sample};
use crate::processing::colormap::ColorMapper;
use crate::render::Artifact;

/// Why a track file could not be turned into samples.
#[derive(thiserror::Error, Debug)]
pub enum ParseCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("missing required column(s): {0}")]
    MissingColumns(String),
    #[error("file has no header row")]
    Empty,
}

/// Common error type for every pipeline operation.
///
/// None of these are fatal: each one is raised at the user action that
/// triggered it and leaves the prior dataset, selection and artifact intact.
#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    #[error("cannot parse track file {path}: {cause}")]
    ParseFailure {
        path: String,
        #[source]
        cause: ParseCause,
    },
    #[error("invalid filter range: {0}")]
    InvalidFilterRange(String),
    #[error("no samples in the selected time window")]
    EmptyView,
    #[error("degenerate value range [{min}, {max}]")]
    DegenerateRange { min: f64, max: f64 },
    #[error("unknown palette: {0}")]
    UnknownPalette(String),
    #[error("render failure: {0}")]
    Render(String),
}

pub type TrackResult<T> = Result<T, TrackError>;

/// Input handed to a renderer for one render cycle.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub samples: &'a [Sample],
    pub metric: Metric,
    /// Colour scale for the active value window; `None` when no scale could be derived.
    pub mapper: Option<&'a ColorMapper>,
}

/// Trait shared by the renderers that turn a filtered view into a displayable document.
pub trait ArtifactRenderer {
    fn render(&self, input: RenderInput<'_>) -> TrackResult<Artifact>;
}
