mod app;
mod renderer;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;
use trace_browser_core::model::ThreadRegistry;
use trace_browser_core::parsers::{DEFAULT_MAX_EVENTS, Ingested, LoadOptions, load_trace_file};
use trace_browser_core::scroll::{ScrollController, ViewportState};
use trace_browser_core::svg::render_svg;
use trace_browser_core::views::{WindowStyle, render_window, rows_that_fit};
use trace_browser_protocol::Viewport;

use crate::app::App;

#[derive(Parser, Debug)]
#[command(
    name = "trace-browser",
    version,
    about = "Browse a JSON-Lines execution trace, one column per thread"
)]
struct Cli {
    /// Trace file with one JSON record per line.
    file: PathBuf,

    /// Number of records to keep from the end of the file.
    #[arg(short = 'n', long = "tail", default_value_t = DEFAULT_MAX_EVENTS)]
    tail: usize,

    /// Write diagnostics to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Render the window to an SVG file and exit.
    #[arg(long, value_name = "OUT")]
    svg: Option<PathBuf>,

    /// SVG width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// SVG height in pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Scroll position the SVG is rendered at.
    #[arg(long, default_value_t = 0)]
    position: usize,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let options = LoadOptions {
        max_events: cli.tail,
    };
    let ingested = load_trace_file(&cli.file, &options)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;

    match &cli.svg {
        Some(out) => export_svg(&cli, ingested, out),
        None => run(App::new(ingested)),
    }
}

fn export_svg(cli: &Cli, ingested: Ingested, out: &Path) -> Result<()> {
    let log = ingested.log;
    let registry = ThreadRegistry::build(&log);
    let style = WindowStyle::default();
    let viewport = Viewport::new(cli.width, cli.height);

    let state = snapshot_state(log.len(), cli.position, &viewport, &style);
    let commands = render_window(&log, &registry, &state, &viewport, &style);
    let svg = render_svg(&commands, cli.width, cli.height);
    std::fs::write(out, svg).with_context(|| format!("cannot write {}", out.display()))?;
    tracing::info!(path = %out.display(), commands = commands.len(), "wrote svg snapshot");
    Ok(())
}

/// Viewport for a headless snapshot. Positions past the end clamp to it.
fn snapshot_state(
    len: usize,
    position: usize,
    viewport: &Viewport,
    style: &WindowStyle,
) -> ViewportState {
    let mut controller = ScrollController::new(len);
    controller.set_scroll_position(i64::try_from(position).unwrap_or(i64::MAX));
    controller.set_window_size(rows_that_fit(viewport.height, &style.metrics));
    controller.state()
}

fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit() {
        let size = terminal.size()?;
        app.resize(ratatui::layout::Rect::new(0, 0, size.width, size.height));

        if app.take_dirty() {
            terminal.draw(|frame| renderer::draw(frame, app))?;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(..) => app.mark_dirty(),
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_position_clamps_to_log_end() {
        let viewport = Viewport::new(1280.0, 720.0);
        let style = WindowStyle::default();
        for position in [40, usize::MAX, i64::MAX as usize + 1] {
            let state = snapshot_state(40, position, &viewport, &style);
            assert_eq!(state.scroll_position, 40);
        }
        assert_eq!(snapshot_state(40, 7, &viewport, &style).scroll_position, 7);
    }

    #[test]
    fn snapshot_window_matches_list_capacity() {
        let style = WindowStyle::default();
        let state = snapshot_state(40, 0, &Viewport::new(100.0, 180.0), &style);
        assert_eq!(state.window_size, 10);
    }
}
