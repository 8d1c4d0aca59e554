use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dispatch_core::logging::{LoggingConfig, init_logging};
use dispatch_core::{Applied, Call, CallStore, Config};
use dispatch_feed::{ConsoleFeed, RetryConfig, ScriptedFeed, fetch_with_retry, open_feed};
use dispatch_ui::App;
use futures::StreamExt;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Dispatch - live 911 call console
#[derive(Parser, Debug)]
#[command(name = "dispatch")]
#[command(about = "Terminal console for AI-assisted emergency dispatch", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to dispatch.toml
    #[arg(short, long, value_name = "PATH", default_value = "dispatch.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive console
    Console {
        /// Replay a TOML script instead of connecting to the backend
        #[arg(short, long, value_name = "PATH", conflicts_with = "demo")]
        script: Option<PathBuf>,

        /// Replay the built-in demo script
        #[arg(long)]
        demo: bool,
    },
    /// Print live call events without the interactive console
    Watch {
        #[arg(short, long, value_name = "PATH", conflicts_with = "demo")]
        script: Option<PathBuf>,

        #[arg(long)]
        demo: bool,
    },
    /// Check backend health and count active calls
    Status,
    /// Write an example dispatch.toml
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        return cmd_init(&cli.config, force);
    }

    let config = load_config(&cli.config, cli.verbose)?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    match cli.command {
        Commands::Console { script, demo } => {
            let _guard = init_logging(Some(
                LoggingConfig::from(config.logging.clone()).without_stderr().with_file_logging(),
            ))
            .context("Failed to initialize logging")?;
            let feed = select_feed(&config, script.as_deref(), demo)?;
            runtime.block_on(cmd_console(config, feed))
        }
        Commands::Watch { script, demo } => {
            let mut logging = LoggingConfig::from(config.logging.clone());
            if cli.verbose {
                logging = logging.with_level("debug");
            }
            let _guard = init_logging(Some(logging)).context("Failed to initialize logging")?;
            let feed = select_feed(&config, script.as_deref(), demo)?;
            let retry = RetryConfig::from_config(&config.feed);
            runtime.block_on(cmd_watch(feed, retry)).map(|_| ())
        }
        Commands::Status => {
            let feed = select_feed(&config, None, false)?;
            runtime.block_on(cmd_status(&config, feed))
        }
        Commands::Init { .. } => Ok(()),
    }
}

/// Load config from file, falling back to defaults when there is none
fn load_config(path: &Path, verbose: bool) -> Result<Config> {
    if path.exists() {
        if verbose {
            println!("{} Loading config from {}", "Info:".green().bold(), path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))
    } else {
        if verbose {
            println!(
                "{} No config at {}, using defaults (run `dispatch init` to create one)",
                "Info:".blue().bold(),
                path.display()
            );
        }
        Ok(Config::default())
    }
}

fn select_feed(config: &Config, script: Option<&Path>, demo: bool) -> Result<Arc<dyn ConsoleFeed>> {
    if demo {
        return Ok(Arc::new(ScriptedFeed::demo().context("Failed to load demo script")?));
    }
    open_feed(&config.feed, script).context("Failed to open call source")
}

/// Write the example configuration
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    std::fs::write(path, Config::example()).context("Failed to write config")?;
    println!("{} Created config at {}", "Success:".green().bold(), path.display());
    Ok(())
}

/// Run the interactive console
async fn cmd_console(config: Config, feed: Arc<dyn ConsoleFeed>) -> Result<()> {
    tracing::info!(source = %feed.describe(), "console starting");
    let mut app = App::new(feed, &config);
    dispatch_ui::run(&mut app).await.context("Console failed")?;
    tracing::info!("console closed");
    Ok(())
}

/// Load, then print one line per live event until the source ends or Ctrl-C
///
/// Returns the number of live events seen.
async fn cmd_watch(feed: Arc<dyn ConsoleFeed>, retry: RetryConfig) -> Result<u64> {
    let calls = fetch_with_retry(feed.as_ref(), &retry)
        .await
        .with_context(|| format!("Failed to load calls from {}", feed.describe()))?;

    let mut store = CallStore::new();
    store.initialize(calls).context("Call source returned invalid calls")?;

    println!("{} {} calls from {}", "Loaded:".green().bold(), store.len(), feed.describe().cyan());
    for call in store.snapshot().iter() {
        println!("  {}", call_summary(call));
    }

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut events = feed.subscribe(cancel.clone()).await.context("Failed to subscribe to live events")?;
    let mut seen = 0;
    while let Some(item) = events.next().await {
        let event = item.context("Live updates lost")?;
        let kind = event.kind();
        let call_id = event.call_id().to_string();
        let applied = store.apply(event);
        seen += 1;

        println!(
            "{} {:<18} {:<12} {}",
            chrono::Local::now().format("%H:%M:%S").dimmed(),
            kind,
            call_id.cyan(),
            outcome_label(applied)
        );
    }

    cancel.cancel();
    println!("{} {} events, {} calls", "Done:".green().bold(), seen, store.len());
    Ok(seen)
}

/// Show backend health and how many calls it reports
async fn cmd_status(config: &Config, feed: Arc<dyn ConsoleFeed>) -> Result<()> {
    println!("{}", "Dispatch Status".green().bold().underline());
    println!();

    println!("{} Configuration", "Info:".blue().bold());
    println!("  Source: {}", feed.describe().cyan());
    println!("  Request timeout: {} ms", config.feed.request_timeout_ms);
    println!("  Reveal interval: {} ms", config.console.reveal_interval_ms);
    println!();

    let health = feed.check_health().await.context("Health check failed")?;
    if health.healthy {
        println!("{} healthy ({} ms)", "Backend:".green().bold(), health.latency_ms);
    } else {
        println!(
            "{} unreachable: {}",
            "Backend:".red().bold(),
            health.error.as_deref().unwrap_or("unknown error")
        );
    }
    if let Some(message) = &health.message {
        println!("  {}", message.dimmed());
    }

    if health.healthy {
        match fetch_with_retry(feed.as_ref(), &RetryConfig::none()).await {
            Ok(calls) => println!("  Active calls: {}", calls.len().to_string().cyan()),
            Err(e) => println!("  Active calls: {} ({})", "unavailable".yellow(), e),
        }
    }

    Ok(())
}

fn call_summary(call: &Call) -> String {
    let incident = if call.incident_type.is_empty() { "Unclassified" } else { &call.incident_type };
    let ai = if call.ai_handling { " AI" } else { "" };
    format!("{} {} {} · {} · {}{}", call.priority.as_str(), call.id, incident, call.location(), call.status, ai)
}

fn outcome_label(applied: Applied) -> String {
    match applied {
        Applied::Inserted => "inserted".green().to_string(),
        Applied::Updated => "updated".green().to_string(),
        Applied::Unchanged => "unchanged".dimmed().to_string(),
        Applied::Dropped => "dropped".yellow().to_string(),
        Applied::UnknownCall => "unknown call".yellow().to_string(),
    }
}
