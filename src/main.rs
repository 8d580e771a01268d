use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thermal_analytics::{build_dashboard_stats, ReportGenerator};
use thermal_core::config::{AppConfig, StoreBackend};
use thermal_core::file_store::FileSessionStore;
use thermal_core::normalize::parse_timestamp;
use thermal_core::pagination::Pagination;
use thermal_core::store::{build_source, SessionQuery};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "thermal-dashboard",
    about = "Dashboard backend for sauna and cold plunge session telemetry",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/thermal-dashboard/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print dashboard statistics (default)
    Stats {
        /// Only sessions belonging to this user
        #[arg(short, long)]
        user: Option<String>,
        /// Emit the full dashboard as JSON
        #[arg(long)]
        json: bool,
        /// Evaluate as of this RFC 3339 instant instead of the current time
        #[arg(long)]
        now: Option<String>,
    },

    /// Print a markdown report
    Report {
        #[arg(short, long)]
        user: Option<String>,
        #[arg(long)]
        now: Option<String>,
    },

    /// List stored sessions, newest first
    Sessions {
        #[arg(short, long)]
        user: Option<String>,
        /// Page size (1-100, default 50)
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<f64>,
        /// Rows to skip
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<f64>,
    },

    /// Copy a JSON export of session rows into the file store
    Import {
        /// JSON file holding one row or an array of rows
        file: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "thermal_dashboard=info,thermal_core=info,thermal_server=info,warn".into()
        }))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config.
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Some(Commands::Stats { user, json, now }) => {
            print_stats(&config, user, json, now.as_deref()).await?;
        }
        None => {
            print_stats(&config, None, false, None).await?;
        }
        Some(Commands::Report { user, now }) => {
            let now = resolve_now(now.as_deref())?;
            let sessions = fetch_recent(&config, user).await?;
            let stats = build_dashboard_stats(&sessions, now);
            print!("{}", ReportGenerator::markdown_report(&stats));
        }
        Some(Commands::Sessions {
            user,
            limit,
            offset,
        }) => {
            let source = build_source(&config.store)?;
            let query = SessionQuery::page(user, Pagination::new(limit, offset));
            let sessions = source.fetch(&query).await?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        Some(Commands::Import { file }) => {
            if config.store.backend != StoreBackend::File {
                bail!("import only works with the file store backend");
            }
            let store = FileSessionStore::new(config.store.resolved_sessions_dir());
            let count = store.import(&file).await?;
            println!("Imported {} session rows into {}", count, store.dir().display());
        }
        Some(Commands::Serve { host, port }) => {
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            thermal_server::serve(config).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config)?;
        }
    }

    Ok(())
}

fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(text) => match parse_timestamp(text) {
            Some(ts) => Ok(ts),
            None => bail!("could not parse --now value: {}", text),
        },
        None => Ok(Utc::now()),
    }
}

async fn fetch_recent(
    config: &AppConfig,
    user: Option<String>,
) -> Result<Vec<thermal_core::SessionRecord>> {
    let source = build_source(&config.store)?;
    let query = SessionQuery::recent(user, config.dashboard.history_limit);
    let sessions = source.fetch(&query).await?;
    tracing::info!("Loaded {} sessions from the {} store", sessions.len(), source.name());
    Ok(sessions)
}

async fn print_stats(
    config: &AppConfig,
    user: Option<String>,
    json: bool,
    now: Option<&str>,
) -> Result<()> {
    let now = resolve_now(now)?;
    let sessions = fetch_recent(config, user).await?;
    let stats = build_dashboard_stats(&sessions, now);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", ReportGenerator::text_summary(&stats));
    }
    Ok(())
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AppConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AppConfig::default_path().display());
        }
    }
    Ok(())
}
