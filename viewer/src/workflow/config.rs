use anyhow::Context;
use chrono::NaiveDateTime;
use radtrackcore::ingest::track::parse_timestamp;
use radtrackcore::processing::{RelativeWindow, DEFAULT_PALETTE};
use radtrackcore::render::{ChartConfig, MapConfig};
use radtrackcore::Metric;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one viewing run needs: inputs, filters and outputs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub files: Vec<PathBuf>,
    pub metric: Metric,
    pub colormap: String,
    /// Window bounds in any accepted track time layout; unset means the data extent.
    pub start: Option<String>,
    pub stop: Option<String>,
    pub relative_min: f64,
    pub relative_max: f64,
    pub map_output: PathBuf,
    pub time_plot_output: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub map: MapConfig,
    pub chart: ChartConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            metric: Metric::DoseRate,
            colormap: DEFAULT_PALETTE.to_string(),
            start: None,
            stop: None,
            relative_min: RelativeWindow::FULL.min,
            relative_max: RelativeWindow::FULL.max,
            map_output: PathBuf::from("map.html"),
            time_plot_output: None,
            export: None,
            map: MapConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session config {}", path_ref.display()))?;
        let config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn relative_window(&self) -> RelativeWindow {
        RelativeWindow::new(self.relative_min, self.relative_max)
    }

    pub fn start_time(&self) -> anyhow::Result<Option<NaiveDateTime>> {
        parse_bound("start", self.start.as_deref())
    }

    pub fn stop_time(&self) -> anyhow::Result<Option<NaiveDateTime>> {
        parse_bound("stop", self.stop.as_deref())
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> anyhow::Result<Option<NaiveDateTime>> {
    value
        .map(|text| {
            parse_timestamp(text).with_context(|| format!("unrecognised {name} time '{text}'"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_cover_full_window() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.relative_window(), RelativeWindow::FULL);
        assert_eq!(cfg.colormap, "viridis");
        assert_eq!(cfg.start_time().unwrap(), None);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"files: [a.rctrk, b.rctrk]\nmetric: CountRate\ncolormap: magma\n\
start: 2024-05-01 10:00:00\nrelative_min: 30\nrelative_max: 70\nmap:\n  zoom: 15\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = SessionConfig::load(&path).unwrap();
        assert_eq!(cfg.files.len(), 2);
        assert_eq!(cfg.metric, Metric::CountRate);
        assert_eq!(cfg.relative_window(), RelativeWindow::new(30.0, 70.0));
        assert_eq!(cfg.map.zoom, 15);
        assert_eq!(cfg.map.marker_radius, 5.0);
        assert!(cfg.start_time().unwrap().is_some());
    }

    #[test]
    fn unparseable_bound_is_an_error() {
        let cfg = SessionConfig {
            stop: Some("tomorrow".into()),
            ..Default::default()
        };
        assert!(cfg.stop_time().is_err());
    }
}
