use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{LevelFilter, WriteLogger};

use breathe::config::Config;
use breathe::engine::pdf::MupdfEngine;
use breathe::event_source::KeyboardEventSource;
use breathe::panic_handler;
use breathe::tui::{self, HALF_BLOCK};
use breathe::viewer::Viewer;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Document to open
    file: PathBuf,

    /// Configuration file (default: <config dir>/breathe/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the debug log
    #[arg(long, default_value = "breathe.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    WriteLogger::init(
        LevelFilter::Debug,
        simplelog::Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("creating {}", args.log_file.display()))?,
    )?;
    info!("Starting breathe");

    let config = Config::load(args.config.as_deref())?;
    let (columns, rows) = crossterm::terminal::size()?;
    let mut viewer = Viewer::open(MupdfEngine::new(), &args.file, config, HALF_BLOCK, columns, rows)
        .with_context(|| format!("opening {}", args.file.display()))?;

    panic_handler::initialize_panic_handler();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| warn!("clipboard unavailable: {e}"))
        .ok();
    let mut copy = |text: &str| {
        let Some(clipboard) = clipboard.as_mut() else {
            return;
        };
        if let Err(e) = clipboard.set_text(text) {
            warn!("failed to copy to clipboard: {e}");
        }
    };

    let res = tui::run(
        &mut terminal,
        &mut viewer,
        &mut KeyboardEventSource,
        &mut copy,
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("Application error: {err:?}");
    }
    info!("Shutting down breathe");
    res
}
