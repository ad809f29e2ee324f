pub mod map;
pub mod timeseries;

pub use map::{MapConfig, MapRenderer};
pub use timeseries::{ChartConfig, TimeSeriesRenderer};

use crate::prelude::{TrackError, TrackResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtifactKind {
    Map,
    TimeSeries,
}

impl ArtifactKind {
    /// File name the display surface conventionally loads the artifact from.
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Map => "map.html",
            ArtifactKind::TimeSeries => "time_plot.html",
        }
    }
}

/// Self-contained HTML document produced by a renderer. Persisting or
/// displaying it is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub content: String,
    /// Markers on a map, points on a chart.
    pub points: usize,
}

impl Artifact {
    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }
}

/// JSON literal safe to embed inside a `<script>` element.
pub(crate) fn script_json<T: Serialize + ?Sized>(value: &T) -> TrackResult<String> {
    serde_json::to_string(value)
        .map(|json| json.replace("</", "<\\/"))
        .map_err(|err| TrackError::Render(err.to_string()))
}

/// Escapes text for HTML element content and attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_json_neutralises_closing_tags() {
        assert_eq!(script_json("a</script>").unwrap(), "\"a<\\/script>\"");
    }

    #[test]
    fn escape_html_replaces_markup() {
        assert_eq!(escape_html("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
        assert_eq!(ArtifactKind::TimeSeries.file_name(), "time_plot.html");
    }
}
