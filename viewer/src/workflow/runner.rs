use crate::workflow::config::SessionConfig;
use anyhow::Context;
use log::{info, warn};
use radtrackcore::prelude::TrackError;
use radtrackcore::processing::{FilterRequest, TimeWindow};
use radtrackcore::render::Artifact;
use radtrackcore::telemetry::MetricsSnapshot;
use radtrackcore::Session;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one run, handed to the display bridge and the summary line.
pub struct WorkflowResult {
    pub samples: usize,
    pub map: Option<Artifact>,
    pub time_plot: Option<Artifact>,
    pub map_path: Option<PathBuf>,
    pub time_plot_path: Option<PathBuf>,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: SessionConfig,
}

impl Runner {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let mut session = Session::new(self.config.map.clone(), self.config.chart.clone());

        for path in &self.config.files {
            match session.load_file(path) {
                Ok(added) => info!("loaded {} samples from {}", added, path.display()),
                // Reported by the session; the file is skipped.
                Err(TrackError::ParseFailure { .. }) => continue,
                Err(err) => return Err(err).context("loading track files"),
            }
        }

        if let Some(request) = self.filter_request(&session)? {
            let applied = session.apply(request).map(|_| ());
            let rendered = match applied {
                // Rejected before any change, so the loaded selection still stands.
                Err(TrackError::InvalidFilterRange(_)) | Err(TrackError::UnknownPalette(_)) => {
                    warn!("keeping previous filters");
                    session.render_map().map(|_| ())
                }
                other => other,
            };
            match rendered {
                Ok(()) => {}
                // Already reported by the session; there is no earlier map to keep.
                Err(TrackError::DegenerateRange { .. }) => {}
                Err(err) => return Err(err).context("rendering map"),
            }
        } else {
            session.render_map().context("rendering basemap")?;
        }

        let map = session.last_map().cloned();
        let map_path = match &map {
            Some(artifact) => Some(self.write_artifact(artifact, &self.config.map_output)?),
            None => {
                warn!(
                    "no map rendered; {} not written",
                    self.config.map_output.display()
                );
                None
            }
        };

        match (&map_path, &self.config.export) {
            (Some(written), Some(target)) => export_map(written, target)?,
            (None, Some(target)) => {
                warn!("no map to export; skipping {}", target.display())
            }
            _ => {}
        }

        let mut time_plot = None;
        let mut time_plot_path = None;
        if let Some(target) = &self.config.time_plot_output {
            match session.render_time_series() {
                Ok(artifact) => {
                    time_plot_path = Some(self.write_artifact(&artifact, target)?);
                    time_plot = Some(artifact);
                }
                Err(err) => warn!("time plot skipped: {}", err),
            }
        }

        Ok(WorkflowResult {
            samples: session.aggregator().dataset().len(),
            map,
            time_plot,
            map_path,
            time_plot_path,
            metrics: session.metrics(),
        })
    }

    /// Builds the request from the config, filling unset time bounds from the data.
    /// `None` when nothing is loaded.
    fn filter_request(&self, session: &Session) -> anyhow::Result<Option<FilterRequest>> {
        let Some(current) = session.aggregator().selection().time_window else {
            return Ok(None);
        };
        let start = self.config.start_time()?.unwrap_or(current.start);
        let stop = self.config.stop_time()?.unwrap_or(current.stop);
        Ok(Some(FilterRequest {
            metric: self.config.metric,
            colormap: self.config.colormap.clone(),
            time_window: TimeWindow::new(start, stop),
            value_window: self.config.relative_window(),
        }))
    }

    fn write_artifact(&self, artifact: &Artifact, path: &Path) -> anyhow::Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
        fs::write(path, artifact.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {} ({} points)", path.display(), artifact.points);
        Ok(path.to_path_buf())
    }
}

/// Copies the last rendered map verbatim to a user-chosen location.
pub fn export_map(rendered: &Path, target: &Path) -> anyhow::Result<()> {
    fs::copy(rendered, target).with_context(|| {
        format!(
            "exporting {} to {}",
            rendered.display(),
            target.display()
        )
    })?;
    info!("exported map to {}", target.display());
    Ok(())
}
