pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean, or `None` for an empty sequence.
    pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
        let (sum, count) = values
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            return None;
        }
        Some(sum / count as f64)
    }

    /// Smallest and largest value, or `None` for an empty sequence.
    pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
    }

    /// Position of `value` inside `[min, max]`, clamped to `[0, 1]`.
    pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }
}
