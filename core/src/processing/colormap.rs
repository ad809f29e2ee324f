use crate::ingest::Metric;
use crate::math::stats::StatsHelper;
use crate::prelude::{TrackError, TrackResult};
use crate::processing::palettes::Palette;
use crate::processing::selection::ValueRange;
use serde::Serialize;

/// Number of evenly spaced samples making up a legend.
pub const LEGEND_STOPS: usize = 256;

/// Deterministic value-to-colour function over an absolute value range.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapper {
    range: ValueRange,
    palette: Palette,
}

impl ColorMapper {
    pub fn new(min: f64, max: f64, palette_name: &str) -> TrackResult<Self> {
        // Written so NaN bounds are rejected as well.
        if !(min < max) {
            return Err(TrackError::DegenerateRange { min, max });
        }
        let palette = Palette::named(palette_name)
            .ok_or_else(|| TrackError::UnknownPalette(palette_name.to_string()))?;
        Ok(Self {
            range: ValueRange::new(min, max),
            palette,
        })
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// `#rrggbb` colour for `value`; values outside the range take the boundary colour.
    pub fn color_of(&self, value: f64) -> String {
        let t = StatsHelper::normalize(value, self.range.min, self.range.max);
        to_hex(self.palette.sample(t))
    }

    /// Legend of [`LEGEND_STOPS`] samples spanning the range, captioned for `metric`.
    pub fn legend(&self, metric: Metric) -> ColorLegend {
        let last = LEGEND_STOPS - 1;
        let stops = (0..LEGEND_STOPS)
            .map(|i| {
                let value = if i == last {
                    self.range.max
                } else {
                    self.range.min + self.range.span() * i as f64 / last as f64
                };
                LegendStop {
                    value,
                    color: self.color_of(value),
                }
            })
            .collect();
        ColorLegend {
            caption: metric.caption(),
            min: self.range.min,
            max: self.range.max,
            stops,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendStop {
    pub value: f64,
    pub color: String,
}

/// Colour bar shown next to the markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorLegend {
    pub caption: String,
    pub min: f64,
    pub max: f64,
    pub stops: Vec<LegendStop>,
}

impl ColorLegend {
    /// CSS `linear-gradient` running left to right through every stop.
    pub fn css_gradient(&self) -> String {
        let colors: Vec<&str> = self.stops.iter().map(|stop| stop.color.as_str()).collect();
        format!("linear-gradient(to right, {})", colors.join(", "))
    }
}

pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_palette_ends() {
        for name in ["viridis", "magma_r", "RdYlGn", "gray"] {
            let mapper = ColorMapper::new(0.1, 0.5, name).unwrap();
            let palette = Palette::named(name).unwrap();
            assert_eq!(mapper.color_of(0.1), to_hex(palette.first()), "{name}");
            assert_eq!(mapper.color_of(0.5), to_hex(palette.last()), "{name}");
        }
    }

    #[test]
    fn out_of_range_values_clamp_to_boundary_colors() {
        let mapper = ColorMapper::new(10.0, 20.0, "inferno").unwrap();
        assert_eq!(mapper.color_of(-500.0), mapper.color_of(10.0));
        assert_eq!(mapper.color_of(9.999), mapper.color_of(10.0));
        assert_eq!(mapper.color_of(1e9), mapper.color_of(20.0));
    }

    /// Rec. 601 luma of a `#rrggbb` colour.
    fn luma(hex: &str) -> f64 {
        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).unwrap() as f64;
        0.299 * channel(1) + 0.587 * channel(3) + 0.114 * channel(5)
    }

    #[test]
    fn lightness_rises_along_sequential_palettes() {
        for name in ["gray", "viridis", "magma"] {
            let mapper = ColorMapper::new(0.0, 1.0, name).unwrap();
            let legend = mapper.legend(Metric::DoseRate);
            let spot: Vec<f64> = legend
                .stops
                .iter()
                .step_by(51)
                .map(|stop| luma(&stop.color))
                .collect();
            assert_eq!(spot.len(), 6, "{name}");
            assert!(spot.windows(2).all(|pair| pair[0] < pair[1]), "{name}: {spot:?}");
        }
        let reversed = ColorMapper::new(0.0, 1.0, "viridis_r").unwrap();
        assert!(luma(&reversed.color_of(0.0)) > luma(&reversed.color_of(1.0)));
    }

    #[test]
    fn identical_inputs_give_identical_colors() {
        let a = ColorMapper::new(0.0, 3.0, "turbo").unwrap();
        let b = ColorMapper::new(0.0, 3.0, "turbo").unwrap();
        assert_eq!(a.color_of(1.234), b.color_of(1.234));
        assert_eq!(a.legend(Metric::CountRate), b.legend(Metric::CountRate));
    }

    #[test]
    fn degenerate_and_unknown_inputs_are_rejected() {
        assert!(matches!(
            ColorMapper::new(0.2, 0.2, "viridis"),
            Err(TrackError::DegenerateRange { .. })
        ));
        assert!(matches!(
            ColorMapper::new(0.3, 0.2, "viridis"),
            Err(TrackError::DegenerateRange { .. })
        ));
        assert!(matches!(
            ColorMapper::new(f64::NAN, 0.2, "viridis"),
            Err(TrackError::DegenerateRange { .. })
        ));
        assert!(matches!(
            ColorMapper::new(0.0, 1.0, "rainbow-ish"),
            Err(TrackError::UnknownPalette(_))
        ));
    }

    #[test]
    fn legend_spans_range_with_256_stops() {
        let mapper = ColorMapper::new(0.1, 0.5, "viridis").unwrap();
        let legend = mapper.legend(Metric::DoseRate);
        assert_eq!(legend.stops.len(), LEGEND_STOPS);
        assert_eq!(legend.stops[0].value, 0.1);
        assert_eq!(legend.stops[LEGEND_STOPS - 1].value, 0.5);
        assert_eq!(legend.stops[0].color, "#440154");
        assert_eq!(legend.caption, "DoseRate [µSv/h]");
        assert!(legend.css_gradient().starts_with("linear-gradient(to right, #440154"));
    }
}
