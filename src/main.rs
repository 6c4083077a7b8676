use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use instana_provider::config::ProviderConfig;
use instana_provider::host::{schema_summary, Host, Manifest};
use instana_provider::state::DEFAULT_STATE_FILE;
use instana_provider::VERSION;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Declarative resource provider for Instana
#[derive(Parser, Debug)]
#[command(name = "instana-provider", version, about, long_about = None)]
struct Args {
    /// Provider config file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// State file
    #[arg(short, long, global = true, default_value = DEFAULT_STATE_FILE)]
    state: PathBuf,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create, update and delete remote objects to match the manifest
    Apply {
        #[arg(short, long)]
        manifest: PathBuf,
    },
    /// Re-read every managed object
    Refresh,
    /// Delete every managed object
    Destroy,
    /// Adopt an existing remote object
    Import {
        /// Resource type, e.g. instana_alerting_channel_email
        resource_type: String,
        /// Label to store the object under
        label: String,
        /// Remote object id
        id: String,
    },
    /// Print the fields of a resource type, or list all types
    Schema { resource_type: Option<String> },
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

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(tracing_level).into())
                .from_env_lossy(),
        )
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("instana-provider {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("instana-provider").join("instana-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".instana-provider").join("instana-provider.log");
    }
    PathBuf::from("instana-provider.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let config = ProviderConfig::load(args.config.as_deref())?;
    tracing::debug!("Using {:?}", config);

    if let Command::Schema { resource_type } = &args.command {
        return print_schema(&config, resource_type.as_deref());
    }

    let provider = config.build_provider()?;
    let mut host = Host::open(&provider, &args.state)?;

    match args.command {
        Command::Apply { manifest } => {
            let manifest = Manifest::load(&manifest)?;
            let summary = host.apply(&manifest).await?;
            println!(
                "Apply complete: {} created, {} updated, {} unchanged, {} deleted",
                summary.created.len(),
                summary.updated.len(),
                summary.unchanged.len(),
                summary.deleted.len()
            );
        }
        Command::Refresh => {
            let dropped = host.refresh().await?;
            for label in &dropped {
                println!("{}: no longer exists, removed from state", label);
            }
            println!("Refreshed {} resources", host.state().resources.len());
        }
        Command::Destroy => {
            let deleted = host.destroy().await?;
            println!("Destroy complete: {} deleted", deleted.len());
        }
        Command::Import {
            resource_type,
            label,
            id,
        } => {
            host.import(&resource_type, &label, &id).await?;
            println!("Imported {} as {}", id, label);
        }
        Command::Schema { .. } => {}
    }

    Ok(())
}

/// Schema output needs no credentials, only the registry
fn print_schema(config: &ProviderConfig, resource_type: Option<&str>) -> Result<()> {
    let offline = ProviderConfig {
        api_token: "unused".to_string(),
        endpoint: if config.endpoint.is_empty() {
            "localhost".to_string()
        } else {
            config.endpoint.clone()
        },
        ..config.clone()
    };
    let provider = offline.build_provider()?;

    match resource_type {
        Some(name) => {
            for line in schema_summary(provider.resource(name)?) {
                println!("{}", line);
            }
        }
        None => {
            for name in provider.resource_names() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
