use anyhow::Context;
use clap::Parser;
use generator::profile::{write_track, GeneratorConfig};
use gui_bridge::bridge::{default_bind_address, DisplayBridge};
use gui_bridge::model::DisplayModel;
use radtrackcore::processing::{palette_names, DEFAULT_PALETTE};
use radtrackcore::Metric;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::SessionConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Render radiation-survey tracks as colour-coded maps")]
struct Args {
    /// Track files to load, merged in the given order
    #[arg(value_name = "TRACK")]
    files: Vec<PathBuf>,
    /// Load a session config from YAML (track arguments are appended to its files)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Metric that drives marker colour: DoseRate or CountRate
    #[arg(long, default_value = "DoseRate")]
    metric: Metric,
    #[arg(long, default_value = DEFAULT_PALETTE)]
    colormap: String,
    /// Start of the time window (defaults to the earliest sample)
    #[arg(long)]
    start: Option<String>,
    /// End of the time window (defaults to the latest sample)
    #[arg(long)]
    stop: Option<String>,
    /// Lower colour bound on the 0-100 relative scale
    #[arg(long, default_value_t = 0.0)]
    min: f64,
    /// Upper colour bound on the 0-100 relative scale
    #[arg(long, default_value_t = 100.0)]
    max: f64,
    #[arg(long, default_value = "map.html")]
    map_out: PathBuf,
    /// Also render the time plot of the filtered selection
    #[arg(long)]
    time_plot: Option<PathBuf>,
    /// Copy the rendered map to this path
    #[arg(long)]
    export: Option<PathBuf>,
    /// Print the selectable palettes and exit
    #[arg(long, default_value_t = false)]
    list_palettes: bool,
    /// Write a synthetic track file to this path and exit
    #[arg(long)]
    generate: Option<PathBuf>,
    /// Seed for --generate
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Keep serving the rendered artifacts over HTTP until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = default_bind_address())]
    bind: SocketAddr,
}

impl Args {
    fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let mut config = if let Some(path) = &self.config {
            SessionConfig::load(path)?
        } else {
            SessionConfig {
                metric: self.metric,
                colormap: self.colormap.clone(),
                start: self.start.clone(),
                stop: self.stop.clone(),
                relative_min: self.min,
                relative_max: self.max,
                map_output: self.map_out.clone(),
                time_plot_output: self.time_plot.clone(),
                export: self.export.clone(),
                ..Default::default()
            }
        };
        config.files.extend(self.files.iter().cloned());
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_palettes {
        for name in palette_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    if let Some(path) = &args.generate {
        let generator = GeneratorConfig {
            seed: args.seed,
            ..Default::default()
        };
        write_track(&generator, path)?;
        println!("Synthetic track written to {}", path.display());
        return Ok(());
    }

    let session_config = args.session_config()?;
    let runner = Runner::new(session_config);
    let result = runner.execute()?;

    println!(
        "Rendered {} samples -> map {}, time plot {}, warnings {}",
        result.samples,
        result
            .map_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".into()),
        result
            .time_plot_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".into()),
        result.metrics.warnings
    );

    if args.serve {
        let bridge = DisplayBridge::new();
        bridge.publish(&DisplayModel {
            samples: result.samples,
            map_html: result.map.map(|artifact| artifact.content),
            time_plot_html: result.time_plot.map(|artifact| artifact.content),
            metrics: result.metrics,
        })?;
        bridge.serve(args.bind);
        println!("Serving http://{}/map (Ctrl+C to stop)...", args.bind);
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
