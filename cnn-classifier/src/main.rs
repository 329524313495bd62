use anyhow::Result;
use clap::Parser;
use cnn_classifier::cli::{run, Cli};
use cnn_classifier_core::logging::{self, LogSettings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment (RUST_LOG)
    dotenvy::dotenv().ok();

    // Held until exit so buffered log lines reach the file.
    let _log_guard = logging::init(&LogSettings::from_env())?;
    tracing::info!("CLI application startup: logging initialised, environment loaded");

    let cli = Cli::parse();
    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("CLI completed successfully"),
        Err(e) => tracing::error!(error = %e, "CLI exited with error: {:#}", e),
    }
    result
}
