use crate::ingest::{Metric, Sample};
use crate::math::stats::StatsHelper;
use crate::prelude::{ArtifactRenderer, RenderInput, TrackError, TrackResult};
use crate::processing::colormap::{ColorLegend, ColorMapper};
use crate::render::{escape_html, script_json, Artifact, ArtifactKind};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1.0" />
<title>__TITLE__</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" crossorigin="" />
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js" crossorigin=""></script>
<style>
  html, body, #map { height: 100%; width: 100%; margin: 0; padding: 0; }
  .legend { position: absolute; top: 10px; right: 10px; z-index: 1000; background: rgba(255, 255, 255, .9);
    padding: 6px 10px; border-radius: 4px; font: 12px sans-serif; }
  .legend-bar { width: 300px; height: 12px; margin: 4px 0; }
  .legend-ends { display: flex; justify-content: space-between; }
</style>
</head>
<body>
<div id="map"></div>
__LEGEND__<script>
  const map = L.map("map").setView([__LAT__, __LON__], __ZOOM__);
  L.tileLayer(__TILES__, { attribution: __ATTRIBUTION__, maxZoom: 19 }).addTo(map);
  const markers = __MARKERS__;
  for (const m of markers) {
    L.circleMarker([m.lat, m.lon], {
      radius: __RADIUS__, color: m.color, fill: true, fillColor: m.color, fillOpacity: __OPACITY__
    }).bindPopup(m.popup, { maxWidth: __POPUP_WIDTH__ }).addTo(map);
  }
</script>
</body>
</html>
"#;

/// Basemap and marker styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub tile_url: String,
    pub attribution: String,
    /// Zoom used when centring on data.
    pub zoom: u8,
    /// Zoom of the bare basemap shown without data.
    pub empty_zoom: u8,
    pub marker_radius: f64,
    pub fill_opacity: f64,
    pub popup_max_width: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            attribution: "&copy; OpenStreetMap contributors".into(),
            zoom: 12,
            empty_zoom: 2,
            marker_radius: 5.0,
            fill_opacity: 0.7,
            popup_max_width: 200,
        }
    }
}

#[derive(Debug, Serialize)]
struct MarkerSpec {
    lat: f64,
    lon: f64,
    color: String,
    popup: String,
}

/// Projects filtered samples through a colour mapper onto a Leaflet map document.
pub struct MapRenderer {
    config: MapConfig,
    logger: LogManager,
}

impl MapRenderer {
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("map"),
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// World view with no markers and no legend.
    pub fn render_basemap(&self) -> TrackResult<Artifact> {
        let content = self.fill_template(0.0, 0.0, self.config.empty_zoom, &[], None)?;
        Ok(Artifact {
            kind: ArtifactKind::Map,
            content,
            points: 0,
        })
    }

    fn fill_template(
        &self,
        lat: f64,
        lon: f64,
        zoom: u8,
        markers: &[MarkerSpec],
        legend: Option<&ColorLegend>,
    ) -> TrackResult<String> {
        let title = legend
            .map(|legend| format!("Track map - {}", legend.caption))
            .unwrap_or_else(|| "Track map".to_string());
        let legend_html = legend.map(legend_block).unwrap_or_default();

        Ok(TEMPLATE
            .replace("__TITLE__", &escape_html(&title))
            .replace("__LEGEND__", &legend_html)
            .replace("__LAT__", &lat.to_string())
            .replace("__LON__", &lon.to_string())
            .replace("__ZOOM__", &zoom.to_string())
            .replace("__TILES__", &script_json(&self.config.tile_url)?)
            .replace("__ATTRIBUTION__", &script_json(&self.config.attribution)?)
            .replace("__RADIUS__", &self.config.marker_radius.to_string())
            .replace("__OPACITY__", &self.config.fill_opacity.to_string())
            .replace("__POPUP_WIDTH__", &self.config.popup_max_width.to_string())
            .replace("__MARKERS__", &script_json(markers)?))
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl ArtifactRenderer for MapRenderer {
    fn render(&self, input: RenderInput<'_>) -> TrackResult<Artifact> {
        if input.samples.is_empty() {
            self.logger.warn("no samples to plot, rendering bare basemap");
            return self.render_basemap();
        }
        let mapper = input
            .mapper
            .ok_or_else(|| TrackError::Render("map needs a colour scale".into()))?;

        let lat = StatsHelper::mean(input.samples.iter().map(|s| s.latitude)).unwrap_or(0.0);
        let lon = StatsHelper::mean(input.samples.iter().map(|s| s.longitude)).unwrap_or(0.0);
        let markers: Vec<MarkerSpec> = input
            .samples
            .iter()
            .map(|sample| marker(sample, input.metric, mapper))
            .collect();
        let legend = mapper.legend(input.metric);

        let content = self.fill_template(lat, lon, self.config.zoom, &markers, Some(&legend))?;
        self.logger.record(&format!(
            "{} markers coloured by {} on {}",
            markers.len(),
            input.metric,
            mapper.palette().name()
        ));
        Ok(Artifact {
            kind: ArtifactKind::Map,
            content,
            points: markers.len(),
        })
    }
}

fn marker(sample: &Sample, metric: Metric, mapper: &ColorMapper) -> MarkerSpec {
    let value = sample.value(metric);
    let other = metric.other();
    MarkerSpec {
        lat: sample.latitude,
        lon: sample.longitude,
        color: mapper.color_of(value),
        popup: format!(
            "{}: {:.2} {}<br>{}: {:.2} {}<br>Time: {}",
            metric,
            value,
            metric.unit(),
            other,
            sample.value(other),
            other.unit(),
            sample.time.format(TIME_FORMAT)
        ),
    }
}

fn legend_block(legend: &ColorLegend) -> String {
    format!(
        "<div class=\"legend\"><div>{}</div><div class=\"legend-bar\" style=\"background: {}\"></div>\
<div class=\"legend-ends\"><span>{:.2}</span><span>{:.2}</span></div></div>\n",
        escape_html(&legend.caption),
        legend.css_gradient(),
        legend.min,
        legend.max
    )
}
