use radtrackcore::telemetry::MetricsSnapshot;

/// Latest artifacts as seen by the display surface.
#[derive(Debug, Clone, Default)]
pub struct DisplayModel {
    pub samples: usize,
    pub map_html: Option<String>,
    pub time_plot_html: Option<String>,
    pub metrics: MetricsSnapshot,
}

impl DisplayModel {
    pub fn has_map(&self) -> bool {
        self.map_html.is_some()
    }
}
