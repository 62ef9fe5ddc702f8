mod bridge;
mod config;
mod error;
mod event;
mod handler;
mod logging;
mod notify;

use crate::config::load_config;
use crate::error::Result;
use crate::handler::MessageHandler;
use clap::Parser;
use std::process::ExitCode;
use tokio::sync::broadcast;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Suppress per-message console summaries; notifications are still shown
    #[arg(short, long)]
    daemon: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args.config)?;
    logging::init_logging(&config.logging)?;

    tracing::info!(
        config_path = %args.config,
        daemon = args.daemon,
        "starting notification bridge"
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            let _ = shutdown_tx.send(());
        }
    });

    let handler = MessageHandler::new(!args.daemon, &config.notify);
    bridge::run(config.mqtt, handler, shutdown_rx).await?;

    tracing::info!("bridge stopped");
    Ok(())
}
