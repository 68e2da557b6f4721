mod config;
mod declared;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use loadstone_core::Plugin;
use loadstone_lifecycle::{run_boot_sequence, LifecycleController};

use declared::DeclaredPlugin;

#[derive(Parser)]
#[command(name = "loadstone")]
#[command(about = "Loadstone — plugin lifecycle host")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive all declared plugins through the boot sequence
    Run {
        /// Path to the host config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run(config).await,
    }
}

async fn run(path_override: Option<PathBuf>) -> Result<()> {
    let path = path_override.unwrap_or_else(config::config_path);
    let config = config::load_config(&path).await?;

    logging::init(&logging::LogOptions {
        level: config.log_level.clone(),
        dir: config.log_dir.clone(),
    });
    info!(
        path = %path.display(),
        plugins = config.plugins.len(),
        "Starting Loadstone host"
    );

    let plugins: Vec<Arc<dyn Plugin>> = config
        .plugins
        .iter()
        .map(|entry| Arc::new(DeclaredPlugin::from_entry(entry)) as Arc<dyn Plugin>)
        .collect();

    let mut controller = LifecycleController::new();
    let payload = serde_json::json!({
        "host": "loadstone",
        "version": env!("CARGO_PKG_VERSION"),
    });
    let outcome = run_boot_sequence(&mut controller, &plugins, payload).await;

    println!("Plugin states:{}", controller.print_states());

    match outcome {
        Ok(()) => {
            controller.distribute_custom("shutdown").await?;
            info!("Host shut down cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Boot failed");
            Err(e.into())
        }
    }
}
