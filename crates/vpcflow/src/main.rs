mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vpcflow_cloud::StateManager;
use vpcflow_config::ConflictPolicy;

#[derive(Parser)]
#[command(name = "vpcflow", version)]
#[command(
    about = "Provision a VPC, subnet, firewall rules and an instance on Compute Engine",
    long_about = None
)]
struct Cli {
    /// Config file (default: vpcflow.local.yaml, vpcflow.yaml, ~/.config/vpcflow/vpcflow.yaml)
    #[arg(short, long, global = true, env = "VPCFLOW_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Directory holding the .vpcflow run state
    #[arg(long, global = true, default_value = ".")]
    state_dir: PathBuf,

    /// What to do when a resource name is already taken
    #[arg(long, global = true, value_enum)]
    on_conflict: Option<OnConflict>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create network, subnet, firewall rules and instance (default)
    Up,
    /// Show the recorded result of the last run
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnConflict {
    Fail,
    Adopt,
}

impl From<OnConflict> for ConflictPolicy {
    fn from(value: OnConflict) -> Self {
        match value {
            OnConflict::Fail => ConflictPolicy::Fail,
            OnConflict::Adopt => ConflictPolicy::Adopt,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, status lines to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = StateManager::new(&cli.state_dir);

    match cli.command.unwrap_or(Commands::Up) {
        Commands::Up => {
            let mut config = vpcflow_config::load(cli.config.as_deref())?;
            if let Some(policy) = cli.on_conflict {
                config.on_conflict = policy.into();
            }
            commands::up::handle(&config, &state).await
        }
        Commands::Status => commands::status::handle(&state).await,
    }
}
