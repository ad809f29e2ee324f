use crate::ingest::{Sample, TrackParser};
use crate::prelude::{ArtifactRenderer, RenderInput, TrackError, TrackResult};
use crate::processing::aggregator::{Aggregator, FilteredView};
use crate::processing::colormap::ColorMapper;
use crate::processing::selection::FilterRequest;
use crate::render::{Artifact, ChartConfig, MapConfig, MapRenderer, TimeSeriesRenderer};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};
use std::path::Path;

/// Application state passed around by whatever UI drives the pipeline.
///
/// Every user action maps to one synchronous method. Failed actions leave the
/// dataset, the selection and the last rendered map exactly as they were.
pub struct Session {
    aggregator: Aggregator,
    parser: TrackParser,
    map: MapRenderer,
    chart: TimeSeriesRenderer,
    last_map: Option<Artifact>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl Session {
    pub fn new(map: MapConfig, chart: ChartConfig) -> Self {
        Self {
            aggregator: Aggregator::new(),
            parser: TrackParser::new(),
            map: MapRenderer::new(map),
            chart: TimeSeriesRenderer::new(chart),
            last_map: None,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("session"),
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Parses a track file and merges it into the dataset. Returns the number of
    /// samples added; a file that cannot be parsed leaves the dataset unchanged.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> TrackResult<usize> {
        let parsed = match self.parser.parse_file(path) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.metrics.record_failed_load();
                return Err(self.warn(err));
            }
        };
        self.metrics
            .record_load(parsed.samples.len(), parsed.rows_rejected);
        let added = parsed.samples.len();
        self.aggregator.load(parsed.into_samples());
        Ok(added)
    }

    pub fn load(&mut self, samples: Vec<Sample>) {
        self.metrics.record_load(samples.len(), 0);
        self.aggregator.load(samples);
    }

    /// Drops all data, restores the default selection and shows the bare basemap.
    pub fn clear(&mut self) -> TrackResult<&Artifact> {
        self.aggregator.clear();
        let basemap = self.map.render_basemap()?;
        self.metrics.record_map();
        Ok(self.last_map.insert(basemap))
    }

    pub fn set_filters(&mut self, request: FilterRequest) -> TrackResult<()> {
        self.aggregator
            .set_filters(request)
            .map_err(|err| self.warn(err))
    }

    pub fn current_view(&self) -> TrackResult<FilteredView> {
        self.aggregator.current_view()
    }

    /// Applies `request` and re-renders the map in one step.
    pub fn apply(&mut self, request: FilterRequest) -> TrackResult<&Artifact> {
        self.set_filters(request)?;
        self.render_map()
    }

    /// Re-renders the map for the current selection. An empty view degrades to the
    /// bare basemap; a degenerate colour range keeps the previous map.
    pub fn render_map(&mut self) -> TrackResult<&Artifact> {
        let artifact = match self.aggregator.current_view() {
            Ok(view) => {
                let selection = self.aggregator.selection();
                let mapper = ColorMapper::new(
                    view.value_window.min,
                    view.value_window.max,
                    &selection.colormap,
                )
                .map_err(|err| self.warn(err))?;
                self.map.render(RenderInput {
                    samples: &view.samples,
                    metric: view.metric,
                    mapper: Some(&mapper),
                })?
            }
            Err(TrackError::EmptyView) => {
                self.warn(TrackError::EmptyView);
                self.map.render_basemap()?
            }
            Err(err) => return Err(err),
        };
        self.metrics.record_map();
        Ok(self.last_map.insert(artifact))
    }

    /// Line chart of the active metric over the current time window.
    pub fn render_time_series(&self) -> TrackResult<Artifact> {
        let view = self
            .aggregator
            .current_view()
            .map_err(|err| self.warn(err))?;
        let artifact = self.chart.render(RenderInput {
            samples: &view.samples,
            metric: view.metric,
            mapper: None,
        })?;
        self.metrics.record_chart();
        Ok(artifact)
    }

    /// The most recently rendered map, kept for export.
    pub fn last_map(&self) -> Option<&Artifact> {
        self.last_map.as_ref()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn warn(&self, err: TrackError) -> TrackError {
        self.metrics.record_warning();
        self.logger.warn(&err.to_string());
        err
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(MapConfig::default(), ChartConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Metric;
    use crate::processing::selection::{RelativeWindow, TimeWindow};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FIVE_ROWS: &str = "RadTrack export\tRC-102\n\
Timestamp\tTime\tLatitude\tLongitude\tAccuracy\tDoseRate\tCountRate\n\
1\t2024-05-01 10:00:00\t48.10\t11.50\t3\t0.11\t7.0\n\
2\t2024-05-01 10:00:05\t\t11.51\t3\t0.12\t7.5\n\
3\t2024-05-01 10:00:10\t48.12\t11.52\t3\t0.15\t8.0\n\
4\t2024-05-01 10:00:15\t48.13\t11.53\t3\t0.13\t7.2\n\
5\t2024-05-01 10:00:20\t48.14\t11.54\t3\t0.20\t9.1\n";

    fn track_file(text: &str) -> NamedTempFile {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(text.as_bytes()).unwrap();
        temp
    }

    fn loaded_session() -> (Session, NamedTempFile) {
        let file = track_file(FIVE_ROWS);
        let mut session = Session::default();
        assert_eq!(session.load_file(file.path()).unwrap(), 4);
        (session, file)
    }

    #[test]
    fn five_row_file_with_missing_latitude_renders_four_markers() {
        let (mut session, _file) = loaded_session();
        let dataset = session.aggregator().dataset();
        assert_eq!(dataset.len(), 4);

        let extrema = *dataset.extrema().unwrap();
        assert_eq!(extrema.dose_rate.min, 0.11);
        assert_eq!(extrema.dose_rate.max, 0.20);
        assert_eq!(session.aggregator().selection().time_window, Some(extrema.time));
        assert_eq!(extrema.time.start.to_string(), "2024-05-01 10:00:00");
        assert_eq!(extrema.time.stop.to_string(), "2024-05-01 10:00:20");

        let artifact = session.render_map().unwrap();
        assert_eq!(artifact.points, 4);
        assert_eq!(session.metrics().rows_rejected, 1);
    }

    #[test]
    fn identical_filters_render_identical_maps() {
        let (mut session, _file) = loaded_session();
        let mut request = session.aggregator().selection().to_request().unwrap();
        request.colormap = "plasma".into();
        request.value_window = RelativeWindow::new(20.0, 80.0);

        let first = session.apply(request.clone()).unwrap().clone();
        let second = session.apply(request).unwrap().clone();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn rejected_filters_keep_selection_and_last_map() {
        let (mut session, _file) = loaded_session();
        let before_map = session.render_map().unwrap().clone();
        let before_selection = session.aggregator().selection().clone();

        let mut request = before_selection.to_request().unwrap();
        request.time_window = TimeWindow::new(request.time_window.stop, request.time_window.start);
        request.metric = Metric::CountRate;
        assert!(matches!(
            session.apply(request),
            Err(TrackError::InvalidFilterRange(_))
        ));

        assert_eq!(session.aggregator().selection(), &before_selection);
        assert_eq!(session.last_map(), Some(&before_map));
        assert_eq!(session.metrics().warnings, 1);
    }

    #[test]
    fn empty_window_degrades_to_basemap_and_skips_chart() {
        let (mut session, _file) = loaded_session();
        let mut request = session.aggregator().selection().to_request().unwrap();
        let start = request.time_window.start - chrono::Duration::hours(2);
        request.time_window = TimeWindow::new(start, start + chrono::Duration::hours(1));

        let artifact = session.apply(request).unwrap();
        assert_eq!(artifact.points, 0);
        assert!(!artifact.content.contains("class=\"legend\""));
        assert!(matches!(
            session.render_time_series(),
            Err(TrackError::EmptyView)
        ));
    }

    #[test]
    fn degenerate_range_keeps_previous_map() {
        let mut session = Session::default();
        let time = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        session.load(vec![
            Sample::new(time, 48.0, 11.0, 0.2, 5.0),
            Sample::new(time, 48.1, 11.1, 0.2, 6.0),
        ]);
        let mut request = session.aggregator().selection().to_request().unwrap();
        request.metric = Metric::CountRate;
        let previous = session.apply(request.clone()).unwrap().clone();

        request.metric = Metric::DoseRate;
        assert!(matches!(
            session.apply(request),
            Err(TrackError::DegenerateRange { .. })
        ));
        assert_eq!(session.last_map(), Some(&previous));
    }

    #[test]
    fn unreadable_file_leaves_dataset_intact() {
        let (mut session, _file) = loaded_session();
        let broken = track_file("meta\nTime\tLatitude\n");
        assert!(matches!(
            session.load_file(broken.path()),
            Err(TrackError::ParseFailure { .. })
        ));
        assert_eq!(session.aggregator().dataset().len(), 4);
        assert_eq!(session.metrics().files_failed, 1);
    }

    #[test]
    fn clear_resets_to_basemap() {
        let (mut session, _file) = loaded_session();
        session.render_map().unwrap();
        let artifact = session.clear().unwrap();
        assert_eq!(artifact.points, 0);
        assert!(session.aggregator().dataset().is_empty());
        assert!(session.render_time_series().is_err());
    }

    #[test]
    fn time_series_covers_filtered_samples() {
        let (session, _file) = loaded_session();
        let chart = session.render_time_series().unwrap();
        assert_eq!(chart.points, 4);
        assert_eq!(session.metrics().charts_rendered, 1);
    }
}
