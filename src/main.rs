//! StrataSim - Stratigraphic Column Tool
//!
//! A terminal application for recording sedimentary layers and drawing them
//! as a stratigraphic column. Layers can be exported to CSV, drawn to PNG and
//! imported from CSV, TSV or spreadsheet workbooks.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info, warn};

use stratasim::application::{App, AppConfig, AppMode};
use stratasim::domain::{ColumnRenderer, LayerStore, PatternTable};
use stratasim::infrastructure::{FileRepository, PngRasterizer};
use stratasim::presentation::{render_ui, InputHandler};

mod logging;

#[derive(Parser, Debug)]
#[command(name = "stratasim")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.config/stratasim/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// CSV, TSV or workbook file whose layers are loaded before the UI starts
    #[arg(short, long)]
    import: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Draw a layer file without opening the terminal UI
    #[command(name = "render")]
    Render {
        /// CSV, TSV or workbook (.xlsx/.xls/.ods) file with the layers
        input: String,

        /// PNG output path (defaults to the configured PNG filename)
        #[arg(short, long)]
        png: Option<String>,

        /// Also re-export the layers as CSV
        #[arg(long)]
        csv: Option<String>,
    },
}

/// Entry point for StrataSim.
///
/// Without a subcommand this sets up the terminal interface and runs the
/// event loop until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup fails, or if the headless render
/// cannot read its input or write its outputs.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (config, config_error) = AppConfig::load_or_default(cli.config.as_deref());
    let _logging = logging::init(&config.log_filter);
    if let Some(e) = config_error {
        warn!(error = %e, "ignoring unreadable config");
    }

    match cli.command {
        Some(Commands::Render { input, png, csv }) => render_headless(&config, &input, png, csv),
        None => run_interactive(config, cli.import),
    }
}

fn render_headless(
    config: &AppConfig,
    input: &str,
    png: Option<String>,
    csv: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = LayerStore::new();
    let count = FileRepository::import_layers(&mut store, input)?;
    info!(input, count, "rendering layers headless");

    let renderer = ColumnRenderer::new(PatternTable::default(), config.stack_order);
    let rasterizer = PngRasterizer::new(config.png.clone());
    let png_path = png.unwrap_or_else(|| config.png_filename.clone());
    let written = FileRepository::export_png(&store, &renderer, &rasterizer, &png_path)?;
    println!("Wrote {count} layers to {written}");

    if let Some(csv_path) = csv {
        let written = FileRepository::export_csv(&store, &csv_path)?;
        println!("Wrote {written}");
    }
    Ok(())
}

fn run_interactive(config: AppConfig, import: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = LayerStore::new();
    let mut startup_message = None;
    if let Some(path) = import {
        match FileRepository::import_layers(&mut store, &path) {
            Ok(count) => startup_message = Some(format!("Loaded {count} layers from {path}")),
            Err(e) => {
                error!(path = %path, error = %e, "startup import failed");
                startup_message = Some(format!("Import failed: {e}"));
            }
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, config);
    app.status_message = startup_message;
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "terminal loop failed");
        println!("{err:?}");
    }

    Ok(())
}

/// Main event loop. Runs until the user presses 'q' in normal mode.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
