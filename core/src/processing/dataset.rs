use crate::ingest::{Metric, Sample};
use crate::math::stats::StatsHelper;
use crate::processing::selection::{TimeWindow, ValueRange};
use serde::Serialize;

/// Global extrema of everything loaded so far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatasetExtrema {
    pub time: TimeWindow,
    pub dose_rate: ValueRange,
    pub count_rate: ValueRange,
}

impl DatasetExtrema {
    fn compute(samples: &[Sample]) -> Option<Self> {
        let start = samples.iter().map(|s| s.time).min()?;
        let stop = samples.iter().map(|s| s.time).max()?;
        let (dose_min, dose_max) = StatsHelper::extent(samples.iter().map(|s| s.dose_rate))?;
        let (count_min, count_max) = StatsHelper::extent(samples.iter().map(|s| s.count_rate))?;
        Some(Self {
            time: TimeWindow::new(start, stop),
            dose_rate: ValueRange::new(dose_min, dose_max),
            count_rate: ValueRange::new(count_min, count_max),
        })
    }

    pub fn metric(&self, metric: Metric) -> ValueRange {
        match metric {
            Metric::DoseRate => self.dose_rate,
            Metric::CountRate => self.count_rate,
        }
    }
}

/// Samples accumulated across loads, in load order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    samples: Vec<Sample>,
    extrema: Option<DatasetExtrema>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a file's samples after the existing ones and recomputes the extrema
    /// over the whole accumulated sequence. Overlapping time ranges are kept as-is.
    pub fn extend(&mut self, samples: Vec<Sample>) {
        self.samples.extend(samples);
        self.extrema = DatasetExtrema::compute(&self.samples);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.extrema = None;
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `None` until at least one sample has been loaded.
    pub fn extrema(&self) -> Option<&DatasetExtrema> {
        self.extrema.as_ref()
    }

    /// Samples whose time lies inside `window`, in dataset order.
    pub fn within(&self, window: &TimeWindow) -> Vec<Sample> {
        self.samples
            .iter()
            .filter(|sample| window.contains(sample.time))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(minute: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            + Duration::minutes(minute)
    }

    fn sample(minute: i64, dose: f64, count: f64) -> Sample {
        Sample::new(at(minute), 48.0, 11.0, dose, count)
    }

    #[test]
    fn extend_appends_and_recomputes_extrema() {
        let mut dataset = Dataset::new();
        assert!(dataset.extrema().is_none());

        dataset.extend(vec![sample(5, 0.1, 4.0), sample(6, 0.3, 9.0)]);
        dataset.extend(vec![sample(1, 0.5, 2.0)]);

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.samples()[2].time, at(1));
        let extrema = dataset.extrema().unwrap();
        assert_eq!(extrema.time, TimeWindow::new(at(1), at(6)));
        assert_eq!(extrema.dose_rate, ValueRange::new(0.1, 0.5));
        assert_eq!(extrema.metric(Metric::CountRate), ValueRange::new(2.0, 9.0));
    }

    #[test]
    fn extending_with_nothing_keeps_dataset_empty() {
        let mut dataset = Dataset::new();
        dataset.extend(Vec::new());
        assert!(dataset.is_empty());
        assert!(dataset.extrema().is_none());
    }

    #[test]
    fn within_is_inclusive_and_keeps_order() {
        let mut dataset = Dataset::new();
        dataset.extend(vec![sample(3, 0.1, 1.0), sample(1, 0.2, 1.0), sample(9, 0.3, 1.0)]);
        let inside = dataset.within(&TimeWindow::new(at(1), at(3)));
        assert_eq!(inside.len(), 2);
        assert_eq!(inside[0].time, at(3));

        dataset.clear();
        assert!(dataset.is_empty());
        assert!(dataset.extrema().is_none());
    }
}
