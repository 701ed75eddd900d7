mod allowlist;
mod cleaner;
mod config;
mod constants;
mod estimator;
mod executor;
mod headless;
mod model;
mod refresh;
mod registry;
mod selection;
mod session;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Settings;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info};
use ratatui::prelude::*;
use session::Session;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use ui::app::App;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log file for the interactive UI
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Paths that are never counted or deleted, one prefix per line
    #[arg(long, global = true, value_name = "PATH")]
    allowlist: Option<PathBuf>,

    /// Seconds between size refreshes in the interactive UI
    #[arg(long, global = true, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    interval_secs: u64,

    /// Pause after each item so progress stays readable
    #[arg(long, global = true, default_value_t = 500)]
    pause_ms: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print every cleanup item with its current size
    List,
    /// Clean the named items without the interactive UI
    Clean {
        /// Item names as shown by `list`, cleaned in the order given
        #[arg(required_unless_present = "all")]
        names: Vec<String>,

        /// Clean every item
        #[arg(long, conflicts_with = "names")]
        all: bool,
    },
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            refresh_interval: Duration::from_secs(self.interval_secs),
            item_pause: Duration::from_millis(self.pause_ms),
            allowlist: self.allowlist.clone(),
            log_file: self.log_file.clone(),
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

fn init_logging(settings: &Settings, to_file: bool) {
    let env = env_logger::Env::default().default_filter_or(settings.default_log_level());
    let mut builder = env_logger::Builder::from_env(env);

    if to_file {
        match settings.log_file_path().map(|p| open_log_file(&p)) {
            Some(Ok(file)) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // The terminal belongs to the UI; without a file there is nowhere to log.
            _ => return,
        }
    }

    let _ = builder.try_init();
    debug!(
        "Logger initialized with level: {}",
        settings.default_log_level()
    );
}

fn open_log_file(path: &std::path::Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

fn run_tui(settings: &Settings) -> Result<()> {
    let mut app = App::new(Session::new(settings));
    app.start_refresh(settings.refresh_interval);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend)?;

    let res = ui::run_app(&mut terminal, &mut app);

    app.stop_refresh();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = cli.settings();
    init_logging(&settings, cli.command.is_none());
    info!("Starting Clearway");

    match cli.command {
        None => {
            run_tui(&settings)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::List) => {
            headless::list(&Session::new(&settings));
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Clean { names, all }) => {
            let session = Session::new(&settings);
            let ok = headless::clean(&session, &names, all)?;
            Ok(if ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
