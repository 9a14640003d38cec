mod app;
mod event;
mod ui;

/// Version injected at compile time via LABSITE_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("LABSITE_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use labsite::api::{format_fetch_error, LabClient};
use labsite::config::Config;
use labsite::context::{LabContext, LoadState};
use labsite::resource::{LabSource, Resource};
use ratatui::prelude::*;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Terminal client for the research lab's content API
#[derive(Parser, Debug)]
#[command(name = "labsite", version, about, long_about = None)]
struct Args {
    /// Root of the lab API (overrides LAB_API_URL and the config file)
    #[arg(short, long)]
    api_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every collection and print a per-resource summary
    Summary,
    /// Fetch one record by slug and print it as JSON
    Show {
        /// One of: members, projects, collaborations, grants, awards, publications, partnerships
        resource: Resource,
        slug: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Filter from `RUST_LOG`, else from `level`; `None` means logging stays off
fn log_filter(level: LogLevel) -> Option<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Some(filter);
    }
    let tracing_level = level.to_tracing_level()?;
    Some(EnvFilter::new(tracing_level.as_str().to_lowercase()))
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// The TUI owns the terminal, so it logs to a file; headless commands log to stderr.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
fn setup_logging(
    level: LogLevel,
    to_file: bool,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = log_filter(level)?;

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
        return None;
    }

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("labsite started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("labsite").join("labsite.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".labsite").join("labsite.log");
    }
    PathBuf::from("labsite.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let headless = args.command.is_some();
    let default_level = if headless { LogLevel::Warn } else { LogLevel::Off };
    let _log_guard = setup_logging(args.log_level.unwrap_or(default_level), !headless);

    let config = Config::load();
    let api_url = config.effective_api_url(args.api_url.as_deref());
    tracing::info!("Using lab API at {}", api_url);

    let client = LabClient::new(&api_url, config.connect_timeout())
        .with_context(|| format!("Invalid API URL: {}", api_url))?;

    match args.command {
        Some(Command::Summary) => run_summary(client).await,
        Some(Command::Show { resource, slug }) => run_show(&client, resource, &slug).await,
        None => run_tui(client, api_url, config).await,
    }
}

async fn run_summary(client: LabClient) -> Result<()> {
    let context = LabContext::start(Arc::new(client) as Arc<dyn LabSource>);

    match context.settled().await {
        LoadState::Ready(snapshot) => {
            for resource in Resource::ALL {
                let status = match snapshot.failed(resource) {
                    Some(failure) => format!("unavailable: {}", failure.message),
                    None => "ok".to_string(),
                };
                println!(
                    "{:<16} {:>5}  {}",
                    resource.display_name(),
                    snapshot.len_of(resource),
                    status
                );
            }
            Ok(())
        }
        LoadState::Failed(error) => Err(anyhow::Error::new(error)),
        other => Err(anyhow::anyhow!("Load did not settle: {:?}", other)),
    }
}

async fn run_show(client: &LabClient, resource: Resource, slug: &str) -> Result<()> {
    let record: serde_json::Value = labsite::resource::fetch_record(client, resource, slug)
        .await
        .map_err(|e| anyhow::anyhow!("{} ({})", format_fetch_error(&e), e))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn run_tui(client: LabClient, api_url: String, config: Config) -> Result<()> {
    // Start loading before the terminal switches over so the first frame
    // already shows progress
    let context = LabContext::start(Arc::new(client));
    let mut app = App::new(context, api_url, config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;
    cleanup_terminal(&mut terminal)?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::handle_events(app)? {
            return Ok(());
        }

        // Let the load task make progress on a busy terminal
        tokio::task::yield_now().await;
    }
}
