///
/// This module implements the CLI interface for cnn-classifier: command parsing,
/// the async entrypoint and user-visible invocations.
///
/// All pipeline logic (configuration, download, extraction) lives in the
/// [`cnn-classifier-core`] crate; this module only wires it to the command line.
///
/// ## How To Use
/// - Run the binary without arguments to execute the data ingestion stage with
///   the default `config/config.yaml` and `params.yaml`.
/// - `ingest --config <P> --params <P>` does the same with other documents.
/// - `scaffold` creates the project skeleton.
/// - For integration tests: call [`run`] with a constructed [`Cli`].
///
/// [`cnn-classifier-core`]: ../../cnn-classifier-core/
use crate::scaffold::{create_file_structure, project_files};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cnn_classifier_core::download::HttpFetcher;
use cnn_classifier_core::pipeline::{DataIngestionPipeline, DocumentPaths};
use std::path::PathBuf;
use tracing::Span;

/// CLI for cnn-classifier: run pipeline stages of the kidney-disease classifier.
#[derive(Parser)]
#[clap(
    name = "cnn-classifier",
    version,
    about = "Kidney-disease CT image classifier pipeline (data ingestion stage)"
)]
pub struct Cli {
    /// Stage to run; defaults to `ingest` with the default document paths
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the source archive and extract it into the artifacts directory
    Ingest {
        /// Path to the pipeline-config YAML file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Path to the params YAML file
        #[clap(long)]
        params: Option<PathBuf>,
    },
    /// Create the project directory and file skeleton
    Scaffold {
        /// Directory to create the skeleton in
        #[clap(long, default_value = ".")]
        root: PathBuf,
    },
}

/// Async CLI entrypoint for main() and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Ingest {
        config: None,
        params: None,
    });

    match command {
        Commands::Ingest { config, params } => {
            tracing::info!(command = "ingest", "Starting data ingestion");
            let documents = DocumentPaths { config, params };
            let mut pipeline =
                DataIngestionPipeline::new(documents, HttpFetcher::new(), &Span::current());
            let report = pipeline.run().await.context("Data ingestion failed")?;
            tracing::info!(
                command = "ingest",
                archive = %report.archive.display(),
                archive_size = %report.archive_size,
                unzip_dir = %report.unzip_dir.display(),
                files = report.files_extracted,
                "Data ingestion complete"
            );
            Ok(())
        }
        Commands::Scaffold { root } => {
            tracing::info!(command = "scaffold", root = %root.display(), "Creating project skeleton");
            let report = create_file_structure(&root, &project_files())
                .context("Project scaffolding failed")?;
            tracing::info!(
                command = "scaffold",
                created = report.created.len(),
                existing = report.existing.len(),
                "Project skeleton ready"
            );
            Ok(())
        }
    }
}
