use crate::ingest::Metric;
use crate::prelude::{TrackError, TrackResult};
use crate::processing::dataset::DatasetExtrema;
use crate::processing::palettes::DEFAULT_PALETTE;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Inclusive time interval used to filter samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, stop: NaiveDateTime) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.start <= time && time <= self.stop
    }

    pub fn validate(&self) -> TrackResult<()> {
        if self.start > self.stop {
            return Err(TrackError::InvalidFilterRange(format!(
                "time window start {} is after stop {}",
                self.start, self.stop
            )));
        }
        Ok(())
    }
}

/// Absolute interval on a metric's own scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Slider positions on the 0–100 relative scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeWindow {
    pub min: f64,
    pub max: f64,
}

impl RelativeWindow {
    pub const FULL: RelativeWindow = RelativeWindow {
        min: 0.0,
        max: 100.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> TrackResult<()> {
        let in_scale = |v: f64| (0.0..=100.0).contains(&v);
        if !in_scale(self.min) || !in_scale(self.max) {
            return Err(TrackError::InvalidFilterRange(format!(
                "slider window ({}, {}) leaves the 0-100 scale",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(TrackError::InvalidFilterRange(format!(
                "slider minimum {} must be below maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Affine map of the slider positions onto `extent`:
    /// `absolute = relative / 100 * (max - min) + min`.
    pub fn to_absolute(&self, extent: ValueRange) -> ValueRange {
        let map = |relative: f64| relative / 100.0 * extent.span() + extent.min;
        ValueRange::new(map(self.min), map(self.max))
    }
}

impl Default for RelativeWindow {
    fn default() -> Self {
        Self::FULL
    }
}

/// Filter tuple collected by the UI and applied in one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub metric: Metric,
    pub colormap: String,
    pub time_window: TimeWindow,
    pub value_window: RelativeWindow,
}

/// What the user currently has selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub metric: Metric,
    pub colormap: String,
    /// `None` while no data is loaded.
    pub time_window: Option<TimeWindow>,
    pub value_window: RelativeWindow,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            colormap: DEFAULT_PALETTE.to_string(),
            time_window: None,
            value_window: RelativeWindow::FULL,
        }
    }
}

impl SelectionState {
    /// Slider window reinterpreted against the active metric's extrema.
    pub fn absolute_window(&self, extrema: &DatasetExtrema) -> ValueRange {
        self.value_window.to_absolute(extrema.metric(self.metric))
    }

    /// Slider captions such as `Min: 0.1 µSv/h`.
    pub fn slider_labels(&self, extrema: &DatasetExtrema) -> (String, String) {
        let window = self.absolute_window(extrema);
        let unit = self.metric.unit();
        (
            format!("Min: {:.1} {}", window.min, unit),
            format!("Max: {:.1} {}", window.max, unit),
        )
    }

    /// Current selection as a request, when a time window exists.
    pub fn to_request(&self) -> Option<FilterRequest> {
        self.time_window.map(|time_window| FilterRequest {
            metric: self.metric,
            colormap: self.colormap.clone(),
            time_window,
            value_window: self.value_window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn relative_window_maps_affinely() {
        let window = RelativeWindow::new(0.0, 50.0).to_absolute(ValueRange::new(0.1, 0.5));
        assert!((window.min - 0.1).abs() < 1e-12);
        assert!((window.max - 0.3).abs() < 1e-12);
    }

    #[test]
    fn relative_window_rejects_inverted_or_out_of_scale() {
        assert!(RelativeWindow::new(40.0, 40.0).validate().is_err());
        assert!(RelativeWindow::new(60.0, 40.0).validate().is_err());
        assert!(RelativeWindow::new(-1.0, 40.0).validate().is_err());
        assert!(RelativeWindow::new(0.0, 101.0).validate().is_err());
        assert!(RelativeWindow::FULL.validate().is_ok());
    }

    #[test]
    fn time_window_allows_equal_bounds() {
        assert!(TimeWindow::new(at(10), at(10)).validate().is_ok());
        assert!(matches!(
            TimeWindow::new(at(11), at(10)).validate(),
            Err(TrackError::InvalidFilterRange(_))
        ));
        assert!(TimeWindow::new(at(9), at(11)).contains(at(11)));
    }

    #[test]
    fn slider_labels_use_one_decimal_and_unit() {
        let extrema = DatasetExtrema {
            time: TimeWindow::new(at(9), at(11)),
            dose_rate: ValueRange::new(0.1, 0.5),
            count_rate: ValueRange::new(10.0, 30.0),
        };
        let mut selection = SelectionState::default();
        assert_eq!(
            selection.slider_labels(&extrema),
            ("Min: 0.1 µSv/h".to_string(), "Max: 0.5 µSv/h".to_string())
        );
        selection.metric = Metric::CountRate;
        assert_eq!(selection.slider_labels(&extrema).1, "Max: 30.0 cps");
    }

    #[test]
    fn default_selection_has_no_request() {
        let selection = SelectionState::default();
        assert_eq!(selection.colormap, "viridis");
        assert!(selection.to_request().is_none());
    }
}
