use std::fs::File;
use std::io::{Write, stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use restab::controller::Controller;
use restab::domain::{TVConfig, TVError};
use restab::model::{Model, Status};
use restab::table::{fixture_rows, load_rows};
use restab::ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Data file (csv, parquet or arrow). Shows the built-in catalogue if omitted.
    path: Option<String>,

    /// Where to write the log, the terminal belongs to the ui.
    #[arg(long, default_value = "restab.log")]
    log_file: String,

    /// Pixels per terminal cell, horizontally.
    #[arg(long, default_value_t = 10)]
    cell_width: u32,

    /// Pixels per terminal cell, vertically.
    #[arg(long, default_value_t = 20)]
    cell_height: u32,

    /// Event poll interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn expand(path: &str) -> Result<PathBuf, TVError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| TVError::LoadingFailed(format!("cannot expand {path}: {e}")))
}

fn init_logging(path: PathBuf) -> Result<(), TVError> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_env("RESTAB_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| TVError::LoadingFailed(format!("cannot set up logging: {e}")))
}

fn run(args: Args) -> Result<(), TVError> {
    init_logging(expand(&args.log_file)?)?;
    info!("Starting restab with {args:?}");

    let cfg = TVConfig::default()
        .event_poll_time(args.poll_ms)
        .cell_width(args.cell_width.max(1))
        .cell_height(args.cell_height.max(1));

    let (name, rows) = match &args.path {
        Some(path) => {
            let path = expand(path)?;
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("???")
                .to_string();
            (name, load_rows(path)?)
        }
        None => ("catalogue".to_string(), fixture_rows()),
    };

    let mut terminal = ratatui::init();
    let result = MouseCapture::enable(stdout())
        .and_then(|_capture| event_loop(&mut terminal, &cfg, name, rows));
    ratatui::restore();
    result
}

/// Keeps mouse reporting on while alive, also turning it off when unwinding from a panic.
struct MouseCapture<W: Write> {
    out: W,
}

impl<W: Write> MouseCapture<W> {
    fn enable(mut out: W) -> Result<Self, TVError> {
        execute!(out, EnableMouseCapture)?;
        Ok(MouseCapture { out })
    }
}

impl<W: Write> Drop for MouseCapture<W> {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, DisableMouseCapture) {
            error!("Could not disable mouse capture: {e}");
        }
    }
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    cfg: &TVConfig,
    name: String,
    rows: Vec<restab::table::Row>,
) -> Result<(), TVError> {
    let size = terminal.size()?;
    let mut model = Model::init(cfg, name, rows, size.width, size.height);
    let ui = TableUI::new();
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        // Render only after the model or one of its observables changed
        if model.needs_redraw() {
            terminal.draw(|f| ui.draw(&model, f))?;
        }

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message);
        };
    }

    info!("Quitting restab");
    Ok(())
}
