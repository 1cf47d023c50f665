//! BuildWatch CLI tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "buildwatch")]
#[command(about = "BuildWatch operator CLI", long_about = None)]
struct Cli {
    /// Path to a KDL configuration file
    #[arg(long, global = true, env = "BUILDWATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List jobs and their last build
    Jobs,
    /// Trigger a build of a job
    Trigger {
        /// Job name
        job: String,
    },
    /// Print build notifications to stdout instead of Slack
    Poll {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "buildwatch.kdl")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Jobs => commands::jobs::list(config).await?,
        Commands::Trigger { job } => commands::jobs::trigger(config, &job).await?,
        Commands::Poll { once } => commands::poll::run(config, once).await?,
        Commands::Validate { path } => commands::validate(&path)?,
    }

    Ok(())
}
