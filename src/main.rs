mod app;
mod clock;
mod config;
mod format;
mod governance;
mod migration;
mod snapshot;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use clock::{Clock, FixedClock, SystemClock};
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "govboard")]
#[command(version)]
#[command(about = "Governance proposal timelines and v2 → v3 migration at a glance")]
struct Args {
    /// Dashboard snapshot (JSON) exported by the data providers
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Print every caption and migration row as JSON and exit
    #[arg(long)]
    status: bool,

    /// Freeze the clock at this Unix timestamp
    #[arg(long)]
    now: Option<i64>,

    /// Clock sampling interval in seconds (overrides config)
    #[arg(short, long)]
    refresh: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(!args.status);

    let mut config = AppConfig::load()?;
    if let Some(secs) = args.refresh {
        config.clock_refresh_secs = secs;
    }
    ui::install_theme(theme::Theme::from_overrides(&config.theme));

    let clock: Box<dyn Clock> = match args.now {
        Some(ts) => Box::new(FixedClock(ts)),
        None => Box::new(SystemClock),
    };

    let snapshot = args.snapshot.or_else(|| config.snapshot_path.clone());

    if args.status {
        return print_status(&config, snapshot, clock).await;
    }

    // Run TUI
    run_tui(&config, snapshot, clock).await
}

/// Where log lines end up
#[derive(Debug)]
enum LogTarget {
    File(std::fs::File),
    Stderr,
    /// TUI without a usable log file; stderr would draw over the screen
    Discard,
}

impl LogTarget {
    fn choose(tui: bool, log_file: Option<std::fs::File>) -> Self {
        match (tui, log_file) {
            (true, Some(file)) => LogTarget::File(file),
            (true, None) => LogTarget::Discard,
            (false, _) => LogTarget::Stderr,
        }
    }
}

/// The TUI owns the terminal, so its logs go to a file instead
fn init_logging(tui: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env();

    let log_file = if tui { open_log_file() } else { None };
    let registry = tracing_subscriber::registry().with(filter);
    match LogTarget::choose(tui, log_file) {
        LogTarget::File(file) => registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        LogTarget::Stderr => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
        LogTarget::Discard => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
            .init(),
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::data_local_dir()?.join("govboard");
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("govboard.log"))
        .ok()
}

async fn print_status(config: &AppConfig, snapshot: Option<PathBuf>, clock: Box<dyn Clock>) -> Result<()> {
    // Scripts get a hard failure where the TUI would only show a message
    let snapshot = match &snapshot {
        Some(path) => snapshot::DashboardSnapshot::load(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => anyhow::bail!("--status needs a snapshot (--snapshot or snapshot_path in config)"),
    };
    let app = App::from_snapshot(config, snapshot, clock);

    let proposals: Vec<_> = app
        .snapshot
        .proposals
        .iter()
        .zip(app.proposal_captions())
        .map(|(proposal, caption)| {
            serde_json::json!({
                "id": proposal.id,
                "title": proposal.title,
                "state": proposal.timing.state,
                "caption": caption,
            })
        })
        .collect();

    let output = serde_json::json!({
        "now": app.now(),
        "proposals": proposals,
        "migration": app.migration_rows(),
        "selected": app.selected_count(),
    });

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

async fn run_tui(config: &AppConfig, snapshot: Option<PathBuf>, clock: Box<dyn Clock>) -> Result<()> {
    // Create app state before touching the terminal so load errors print normally
    let mut app = App::new(config, snapshot, clock).await?;
    tracing::info!("Starting govboard");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key).await {
                                tracing::warn!("Key handling failed: {:#}", e);
                            }
                        }
                    }
                }
            }
        }

        // Periodic refresh
        if let Err(e) = app.tick().await {
            tracing::warn!("Tick failed: {:#}", e);
        }
    }
}
