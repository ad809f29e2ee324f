use crate::ingest::sample::Sample;
use crate::prelude::{ParseCause, TrackError, TrackResult};
use crate::telemetry::log::LogManager;
use chrono::{DateTime, NaiveDateTime};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Columns every track file must carry; any others are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Time", "Latitude", "Longitude", "DoseRate", "CountRate"];

const TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
];

/// Samples recovered from one track file.
#[derive(Debug, Clone, Default)]
pub struct ParsedTrack {
    pub samples: Vec<Sample>,
    /// Rows dropped because a required field was absent or unparseable.
    pub rows_rejected: usize,
}

impl ParsedTrack {
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Reads tab-delimited track exports into validated samples.
pub struct TrackParser {
    logger: LogManager,
}

impl TrackParser {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("track"),
        }
    }

    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> TrackResult<ParsedTrack> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let file = File::open(path).map_err(|err| TrackError::ParseFailure {
            path: label.clone(),
            cause: err.into(),
        })?;
        self.parse_reader(file, &label)
    }

    /// Parses a track from any reader; `label` names the source in errors and logs.
    pub fn parse_reader<R: Read>(&self, reader: R, label: &str) -> TrackResult<ParsedTrack> {
        let failure = |cause: ParseCause| TrackError::ParseFailure {
            path: label.to_string(),
            cause,
        };

        // The first line is device metadata, never data.
        let mut reader = BufReader::new(reader);
        let mut preamble = String::new();
        let read = reader
            .read_line(&mut preamble)
            .map_err(|err| failure(err.into()))?;
        if read == 0 {
            return Err(failure(ParseCause::Empty));
        }

        let mut rows = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rows.headers().map_err(|err| failure(err.into()))?.clone();
        if headers.is_empty() {
            return Err(failure(ParseCause::Empty));
        }

        let mut indices = [0usize; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();
        for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h == column) {
                Some(idx) => *slot = idx,
                None => missing.push(column),
            }
        }
        if !missing.is_empty() {
            return Err(failure(ParseCause::MissingColumns(missing.join(", "))));
        }

        let mut parsed = ParsedTrack::default();
        for (line, record) in rows.records().enumerate() {
            let sample = record
                .ok()
                .and_then(|record| sample_from_record(&record, &indices));
            match sample {
                Some(sample) => parsed.samples.push(sample),
                None => {
                    parsed.rows_rejected += 1;
                    self.logger
                        .debug(&format!("{}: dropped data row {}", label, line + 1));
                }
            }
        }

        self.logger.record(&format!(
            "{}: {} samples, {} rows dropped",
            label,
            parsed.samples.len(),
            parsed.rows_rejected
        ));
        Ok(parsed)
    }
}

impl Default for TrackParser {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_from_record(record: &csv::StringRecord, indices: &[usize; 5]) -> Option<Sample> {
    let field = |slot: usize| record.get(indices[slot]).filter(|v| !v.is_empty());
    let number = |slot: usize| {
        field(slot)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };

    let time = field(0).and_then(parse_timestamp)?;
    Some(Sample::new(time, number(1)?, number(2)?, number(3)?, number(4)?))
}

/// Parses a Time cell. RFC 3339 stamps carrying an offset are converted to UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.naive_utc());
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
