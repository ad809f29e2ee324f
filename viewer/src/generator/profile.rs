use anyhow::Context;
use chrono::{Duration, NaiveDateTime};
use radtrackcore::ingest::track::parse_timestamp;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Metres per degree of latitude, close enough for synthetic walks.
const METRES_PER_DEGREE: f64 = 111_320.0;

/// Configuration for generating synthetic survey tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub samples: usize,
    pub start: String,
    pub interval_secs: i64,
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub step_m: f64,
    /// Ambient dose rate in µSv/h.
    pub background: f64,
    /// Peak excess dose rate at the middle of the walk.
    pub hotspot: f64,
    /// Counts per second per µSv/h.
    pub cps_per_usvh: f64,
    pub noise: f64,
    pub seed: u64,
    /// Blank the latitude of every n-th row to exercise row rejection.
    pub drop_every: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            samples: 120,
            start: "2024-05-01 10:00:00".into(),
            interval_secs: 5,
            origin_lat: 48.137,
            origin_lon: 11.575,
            step_m: 4.0,
            background: 0.1,
            hotspot: 0.4,
            cps_per_usvh: 60.0,
            noise: 0.05,
            seed: 0,
            drop_every: None,
        }
    }
}

impl GeneratorConfig {
    fn start_time(&self) -> anyhow::Result<NaiveDateTime> {
        parse_timestamp(&self.start)
            .with_context(|| format!("unrecognised start time '{}'", self.start))
    }
}

/// Renders a track file in the device export layout: one preamble line, a
/// header row, then one tab-separated row per sample.
pub fn build_track(config: &GeneratorConfig) -> anyhow::Result<String> {
    let start = config.start_time()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut heading: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
    let (mut lat, mut lon) = (config.origin_lat, config.origin_lon);
    let centre = config.samples as f64 / 2.0;
    let spread = (config.samples as f64 / 8.0).max(1.0);

    let mut text = String::new();
    writeln!(text, "Track: synthetic\tseed {}", config.seed)?;
    writeln!(
        text,
        "Timestamp\tTime\tLatitude\tLongitude\tAccuracy\tDoseRate\tCountRate\tComment"
    )?;

    for index in 0..config.samples {
        let time = start + Duration::seconds(config.interval_secs * index as i64);
        heading += rng.gen_range(-0.4..0.4);
        let step_deg = config.step_m / METRES_PER_DEGREE;
        lat += heading.sin() * step_deg;
        lon += heading.cos() * step_deg / lat.to_radians().cos().max(0.01);

        let distance = (index as f64 - centre) / spread;
        let excess = config.hotspot * (-0.5 * distance * distance).exp();
        let jitter = 1.0 + rng.gen_range(-config.noise..=config.noise);
        let dose = ((config.background + excess) * jitter).max(0.0);
        let counts = dose * config.cps_per_usvh;

        let dropped = config
            .drop_every
            .is_some_and(|every| every > 0 && (index + 1) % every == 0);
        let lat_cell = if dropped {
            String::new()
        } else {
            format!("{lat:.6}")
        };
        writeln!(
            text,
            "{}\t{}\t{}\t{:.6}\t5\t{:.3}\t{:.2}\t",
            time.and_utc().timestamp(),
            time.format("%Y-%m-%d %H:%M:%S"),
            lat_cell,
            lon,
            dose,
            counts
        )?;
    }

    Ok(text)
}

pub fn write_track<P: AsRef<Path>>(config: &GeneratorConfig, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let text = build_track(config)?;
    fs::write(path, text).with_context(|| format!("writing track file {}", path.display()))?;
    Ok(())
}
