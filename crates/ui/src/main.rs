use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use trace_browser_core::parsers::{DEFAULT_MAX_EVENTS, LoadOptions, load_trace_file};
use trace_browser_ui::TraceBrowserApp;

#[derive(Parser, Debug)]
#[command(
    name = "trace-browser-gui",
    version,
    about = "Browse a JSON-Lines execution trace in a desktop window"
)]
struct Cli {
    /// Trace file with one JSON record per line.
    file: PathBuf,

    /// Number of records to keep from the end of the file.
    #[arg(short = 'n', long = "tail", default_value_t = DEFAULT_MAX_EVENTS)]
    tail: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let options = LoadOptions {
        max_events: cli.tail,
    };
    let ingested = load_trace_file(&cli.file, &options)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;
    let initial = Some((cli.file, ingested));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("trace-browser")
            .with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "trace-browser",
        native_options,
        Box::new(move |cc| Ok(Box::new(TraceBrowserApp::new(cc, initial, options)))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
