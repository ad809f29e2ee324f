use crate::ingest::{Metric, Sample};
use crate::math::stats::StatsHelper;
use crate::prelude::{ArtifactRenderer, RenderInput, TrackError, TrackResult};
use crate::render::map::TIME_FORMAT;
use crate::render::{escape_html, Artifact, ArtifactKind};
use crate::telemetry::log::LogManager;
use chrono::Duration;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

/// Chart canvas settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub stroke: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: 70,
            stroke: "#1f77b4".into(),
        }
    }
}

/// Line chart of one metric against time, drawn with `plotters` and wrapped in a standalone HTML page.
pub struct TimeSeriesRenderer {
    config: ChartConfig,
    logger: LogManager,
}

impl TimeSeriesRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("timeseries"),
        }
    }

    /// Draws the chart into an SVG document held in memory.
    fn draw_svg(&self, ordered: &[Sample], metric: Metric, title: &str) -> TrackResult<String> {
        let stroke = parse_stroke(&self.config.stroke)?;
        let first = ordered[0].time;
        // x is milliseconds since the first sample.
        let points: Vec<(f64, f64)> = ordered
            .iter()
            .map(|s| ((s.time - first).num_milliseconds() as f64, s.value(metric)))
            .collect();
        let t_span = points.last().map(|(x, _)| *x).unwrap_or(0.0);
        let x_range = if t_span > 0.0 {
            0.0..t_span
        } else {
            -1000.0..1000.0
        };
        let (y_min, y_max) = StatsHelper::extent(points.iter().map(|(_, y)| *y))
            .map(|(min, max)| if min == max { (min - 0.5, max + 0.5) } else { (min, max) })
            .ok_or(TrackError::EmptyView)?;

        let time_label =
            |ms: &f64| (first + Duration::milliseconds(*ms as i64)).format(TIME_FORMAT).to_string();
        let value_label = |value: &f64| format!("{:.2}", value);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.config.width, self.config.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 20))
                .margin(self.config.margin / 4)
                .x_label_area_size(self.config.margin)
                .y_label_area_size(self.config.margin)
                .build_cartesian_2d(x_range, y_min..y_max)
                .map_err(render_error)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(4)
                .x_desc("Time")
                .y_desc(metric.caption())
                .x_label_formatter(&time_label)
                .y_label_formatter(&value_label)
                .draw()
                .map_err(render_error)?;

            chart
                .draw_series(LineSeries::new(points.iter().copied(), stroke.stroke_width(2)))
                .map_err(render_error)?;
            if let [point] = points.as_slice() {
                chart
                    .draw_series(std::iter::once(Circle::new(*point, 3, stroke.filled())))
                    .map_err(render_error)?;
            }
            root.present().map_err(render_error)?;
        }
        Ok(svg)
    }
}

impl Default for TimeSeriesRenderer {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

impl ArtifactRenderer for TimeSeriesRenderer {
    fn render(&self, input: RenderInput<'_>) -> TrackResult<Artifact> {
        if input.samples.is_empty() {
            return Err(TrackError::EmptyView);
        }

        // Merged files are not chronological, so order by time before drawing.
        let mut ordered: Vec<Sample> = input.samples.to_vec();
        ordered.sort_by_key(|sample| sample.time);

        let metric = input.metric;
        let title = format!("{} vs Time", metric);
        let svg = self.draw_svg(&ordered, metric, &title)?;

        let content = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_html(&title),
            svg
        );

        self.logger
            .record(&format!("{} points plotted for {}", ordered.len(), metric));
        Ok(Artifact {
            kind: ArtifactKind::TimeSeries,
            content,
            points: ordered.len(),
        })
    }
}

/// `#rrggbb` stroke colour from the chart config.
fn parse_stroke(hex: &str) -> TrackResult<RGBColor> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    match (digits.len(), channel(0..2), channel(2..4), channel(4..6)) {
        (6, Some(r), Some(g), Some(b)) => Ok(RGBColor(r, g, b)),
        _ => Err(TrackError::Render(format!("invalid stroke colour '{hex}'"))),
    }
}

fn render_error(err: impl std::fmt::Display) -> TrackError {
    TrackError::Render(err.to_string())
}
