use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use ccr::follow::{parse_setting, submit_follower_index, FollowRequest};
use ccr::tui::routes;
use ccr::{CcrError, CcrResult};
use ccr_core::config::LoggingConfig;
use ccr_core::{ClusterApi, ConsoleConfig, FieldPatch, HttpClusterClient, IndexCatalog};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ccr")]
#[command(about = "Manage cross-cluster replication follower indices", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cluster URL, overrides the configuration
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the terminal console
    Console {
        /// Open the add form with this remote cluster selected
        #[arg(long)]
        cluster: Option<String>,

        /// Open the edit form of this follower index
        #[arg(long, conflicts_with = "cluster")]
        edit: Option<String>,
    },
    /// Create a follower index
    Follow {
        /// Name of the follower index
        #[arg(long)]
        name: String,

        /// Remote cluster holding the leader index
        #[arg(long)]
        remote_cluster: String,

        /// Index on the remote cluster to replicate
        #[arg(long)]
        leader_index: String,

        /// Advanced setting, e.g. max_retry_delay=5s (repeatable)
        #[arg(long = "setting", value_name = "KEY=VALUE")]
        settings: Vec<String>,
    },
    /// List follower indices
    List,
}

#[tokio::main]
async fn main() -> CcrResult<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::from_file(path)?,
        None => ConsoleConfig::from_env()?,
    };
    if let Some(url) = cli.url {
        config.cluster.url = url;
        config.validate()?;
    }

    let is_console = matches!(cli.command, Commands::Console { .. });
    init_logging(&config.logging, is_console)?;

    let client = Arc::new(HttpClusterClient::new(&config.cluster)?);
    let api: Arc<dyn ClusterApi> = client.clone();
    let catalog: Arc<dyn IndexCatalog> = client;

    match cli.command {
        Commands::Console { cluster, edit } => {
            let list_path = config.form.list_path.clone();
            let initial_path = match (edit, cluster) {
                (Some(name), _) => routes::edit_path(&list_path, &name),
                (None, Some(cluster)) => routes::add_path(&list_path, Some(&cluster)),
                (None, None) => list_path,
            };
            ccr::tui::run(config, api, catalog, &initial_path).await?;
        }
        Commands::Follow {
            name,
            remote_cluster,
            leader_index,
            settings,
        } => {
            let settings = settings
                .iter()
                .map(|raw| parse_setting(raw))
                .collect::<CcrResult<FieldPatch>>()?;
            let request = FollowRequest {
                name: name.clone(),
                remote_cluster,
                leader_index,
                settings,
            };

            submit_follower_index(request, api, catalog, &config.form).await?;
            println!("Follower index '{}' created", name);
        }
        Commands::List => {
            let follower_indices = api.list_follower_indices().await?;
            if follower_indices.is_empty() {
                println!("No follower indices");
            }
            for follower in follower_indices {
                println!(
                    "{:<32} {:<20} {:<32} {}",
                    follower.name, follower.remote_cluster, follower.leader_index, follower.status
                );
            }
        }
    }

    Ok(())
}

/// Log to the configured file, or to stderr outside the console. The console
/// owns the terminal, so without a file its logs are dropped.
fn init_logging(config: &LoggingConfig, is_console: bool) -> CcrResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| {
            CcrError::ConfigError(format!("Invalid log directive '{}': {}", config.level, e))
        })?;

    match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if is_console => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
