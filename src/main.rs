use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use connect_four::config::{AppConfig, PlayerKindConfig};
use connect_four::game::GameEvent;
use connect_four::ui::App;

/// Play Connect Four against the computer, or watch it play itself.
#[derive(Parser)]
#[command(name = "connect-four", about = "Connect Four with an alpha-beta engine")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Who plays Red (moves first)
    #[arg(long, value_enum)]
    red: Option<PlayerKindConfig>,

    /// Who plays Yellow
    #[arg(long, value_enum)]
    yellow: Option<PlayerKindConfig>,

    /// Override the base search depth of both players
    #[arg(long)]
    depth: Option<usize>,

    /// Play computer vs computer without the TUI, printing events as JSON lines
    #[arg(long)]
    headless: bool,

    /// Write logs to this file (the TUI logs nowhere otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(kind) = cli.red {
        config.red.kind = kind;
    }
    if let Some(kind) = cli.yellow {
        config.yellow.kind = kind;
    }
    if let Some(depth) = cli.depth {
        config.red.depth = depth;
        config.yellow.depth = depth;
    }
    config.validate().context("invalid configuration")?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    if cli.headless {
        run_headless(&config)
    } else {
        run_tui(&config).context("terminal UI failed")
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("connect_four=info"));

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if cli.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn run_headless(config: &AppConfig) -> Result<()> {
    if config.red.kind != PlayerKindConfig::Computer
        || config.yellow.kind != PlayerKindConfig::Computer
    {
        bail!("headless mode needs two computer players (try --red computer --yellow computer)");
    }

    let (tx, rx) = mpsc::channel::<GameEvent>();
    let mut game = config.build_controller(tx);
    let mut stdout = io::stdout().lock();

    loop {
        for event in rx.try_iter() {
            writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
        }
        if game.is_over() {
            break;
        }
        game.computer_move().context("computer failed to move")?;
    }

    info!(status = ?game.status(), plies = game.history().len(), "game finished");
    Ok(())
}

fn run_tui(config: &AppConfig) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let mut app = App::new(config);
    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res
}
