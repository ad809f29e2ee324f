use crate::ingest::{Metric, Sample};
use crate::prelude::{TrackError, TrackResult};
use crate::processing::dataset::Dataset;
use crate::processing::palettes::is_known_palette;
use crate::processing::selection::{FilterRequest, SelectionState, TimeWindow, ValueRange};
use crate::telemetry::log::LogManager;

/// Samples surviving the time filter plus the absolute colour window for one render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub samples: Vec<Sample>,
    pub metric: Metric,
    pub time_window: TimeWindow,
    pub value_window: ValueRange,
}

/// Merges loaded tracks and owns the selection applied to them.
pub struct Aggregator {
    dataset: Dataset,
    selection: SelectionState,
    logger: LogManager,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            dataset: Dataset::new(),
            selection: SelectionState::default(),
            logger: LogManager::new("aggregator"),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Appends samples and resets the time window to the full accumulated extent.
    /// Slider positions are kept.
    pub fn load(&mut self, samples: Vec<Sample>) {
        let added = samples.len();
        self.dataset.extend(samples);
        if let Some(extrema) = self.dataset.extrema() {
            self.selection.time_window = Some(extrema.time);
        }
        self.logger.record(&format!(
            "loaded {} samples, {} in total",
            added,
            self.dataset.len()
        ));
    }

    pub fn clear(&mut self) {
        self.dataset.clear();
        self.selection = SelectionState::default();
        self.logger.record("dataset cleared");
    }

    /// Validates the whole request before touching the selection; on error nothing changes.
    pub fn set_filters(&mut self, request: FilterRequest) -> TrackResult<()> {
        request.time_window.validate()?;
        request.value_window.validate()?;
        if !is_known_palette(&request.colormap) {
            return Err(TrackError::UnknownPalette(request.colormap));
        }

        self.selection = SelectionState {
            metric: request.metric,
            colormap: request.colormap,
            time_window: Some(request.time_window),
            value_window: request.value_window,
        };
        Ok(())
    }

    pub fn current_view(&self) -> TrackResult<FilteredView> {
        let extrema = self.dataset.extrema().ok_or(TrackError::EmptyView)?;
        let time_window = self.selection.time_window.unwrap_or(extrema.time);

        let samples = self.dataset.within(&time_window);
        if samples.is_empty() {
            return Err(TrackError::EmptyView);
        }

        Ok(FilteredView {
            samples,
            metric: self.selection.metric,
            time_window,
            value_window: self.selection.absolute_window(extrema),
        })
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
