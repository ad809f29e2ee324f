use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One georeferenced measurement taken from a track file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub dose_rate: f64,
    pub count_rate: f64,
}

impl Sample {
    pub fn new(
        time: NaiveDateTime,
        latitude: f64,
        longitude: f64,
        dose_rate: f64,
        count_rate: f64,
    ) -> Self {
        Self {
            time,
            latitude,
            longitude,
            dose_rate,
            count_rate,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::DoseRate => self.dose_rate,
            Metric::CountRate => self.count_rate,
        }
    }
}

/// Scalar quantity that can drive marker colour and the time plot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[default]
    DoseRate,
    CountRate,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::DoseRate, Metric::CountRate];

    /// Column header used by track files and shown in captions.
    pub fn name(self) -> &'static str {
        match self {
            Metric::DoseRate => "DoseRate",
            Metric::CountRate => "CountRate",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::DoseRate => "µSv/h",
            Metric::CountRate => "cps",
        }
    }

    /// The metric that is not selected, shown as secondary popup text.
    pub fn other(self) -> Metric {
        match self {
            Metric::DoseRate => Metric::CountRate,
            Metric::CountRate => Metric::DoseRate,
        }
    }

    /// Legend caption, e.g. `DoseRate [µSv/h]`.
    pub fn caption(self) -> String {
        format!("{} [{}]", self.name(), self.unit())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    /// Accepts the column names as well as loose spellings such as `dose-rate` or `cps`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "doserate" | "dose" => Ok(Metric::DoseRate),
            "countrate" | "count" | "cps" => Ok(Metric::CountRate),
            _ => Err(format!(
                "unknown metric '{s}' (expected DoseRate or CountRate)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn value_selects_metric_field() {
        let time = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let sample = Sample::new(time, 48.1, 11.5, 0.12, 7.5);
        assert_eq!(sample.value(Metric::DoseRate), 0.12);
        assert_eq!(sample.value(Metric::CountRate), 7.5);
    }

    #[test]
    fn caption_names_metric_and_unit() {
        assert_eq!(Metric::DoseRate.caption(), "DoseRate [µSv/h]");
        assert_eq!(Metric::CountRate.caption(), "CountRate [cps]");
        assert_eq!(Metric::CountRate.other(), Metric::DoseRate);
    }

    #[test]
    fn metric_parses_loose_spellings() {
        assert_eq!("DoseRate".parse::<Metric>(), Ok(Metric::DoseRate));
        assert_eq!("dose-rate".parse::<Metric>(), Ok(Metric::DoseRate));
        assert_eq!("count_rate".parse::<Metric>(), Ok(Metric::CountRate));
        assert!("altitude".parse::<Metric>().is_err());
    }
}
