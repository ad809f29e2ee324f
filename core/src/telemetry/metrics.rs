use serde::Serialize;
use std::sync::Mutex;

/// Counters accumulated across a viewing session.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub files_loaded: usize,
    pub files_failed: usize,
    pub rows_accepted: usize,
    pub rows_rejected: usize,
    pub maps_rendered: usize,
    pub charts_rendered: usize,
    pub warnings: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_load(&self, accepted: usize, rejected: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.files_loaded += 1;
            metrics.rows_accepted += accepted;
            metrics.rows_rejected += rejected;
        }
    }

    pub fn record_failed_load(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.files_failed += 1;
        }
    }

    pub fn record_map(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.maps_rendered += 1;
        }
    }

    pub fn record_chart(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.charts_rendered += 1;
        }
    }

    pub fn record_warning(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.warnings += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_accumulates_counts() {
        let recorder = MetricsRecorder::new();
        recorder.record_load(4, 1);
        recorder.record_load(2, 0);
        recorder.record_failed_load();
        recorder.record_warning();
        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.files_loaded, 2);
        assert_eq!(snapshot.rows_accepted, 6);
        assert_eq!(snapshot.rows_rejected, 1);
        assert_eq!(snapshot.files_failed, 1);
        assert_eq!(snapshot.warnings, 1);
    }
}
