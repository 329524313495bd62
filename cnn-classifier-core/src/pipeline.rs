//! Data ingestion stage: resolve configuration → download → extract.
//!
//! # Major Types
//! - [`DataIngestionPipeline`]: runs the stage once and tracks its [`StageState`]
//! - [`IngestionReport`]: what ended up on disk after a successful run
//!
//! # Error Handling
//! Each step returns a typed error. The pipeline logs it once at `error` level
//! under the stage span, moves to [`StageState::Failed`] and hands the error
//! back; nothing is retried or rolled back.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, info_span, warn, Instrument, Span};

use crate::common::get_size;
use crate::configuration::ConfigurationManager;
use crate::contract::Fetcher;
use crate::download::DataIngestion;
use crate::error::IngestionError;

pub const STAGE_NAME: &str = "Data Ingestion Stage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    NotStarted,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionReport {
    pub archive: PathBuf,
    /// Human-readable archive size, e.g. `~57 KB`.
    pub archive_size: String,
    pub unzip_dir: PathBuf,
    pub files_extracted: usize,
}

/// Where the pipeline reads its documents from. `None` means the default path.
#[derive(Debug, Clone, Default)]
pub struct DocumentPaths {
    pub config: Option<PathBuf>,
    pub params: Option<PathBuf>,
}

pub struct DataIngestionPipeline<F: Fetcher> {
    documents: DocumentPaths,
    fetcher: Option<F>,
    span: Span,
    state: StageState,
}

impl<F: Fetcher> DataIngestionPipeline<F> {
    /// Creates a pipeline whose log entries are recorded under a
    /// `data_ingestion` span nested in `parent`.
    pub fn new(documents: DocumentPaths, fetcher: F, parent: &Span) -> Self {
        let span = info_span!(parent: parent, "data_ingestion", stage = STAGE_NAME);
        Self {
            documents,
            fetcher: Some(fetcher),
            span,
            state: StageState::NotStarted,
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    /// Runs the stage. A pipeline runs at most once.
    pub async fn run(&mut self) -> Result<IngestionReport, IngestionError> {
        let span = self.span.clone();
        let fetcher = match (self.state, self.fetcher.take()) {
            (StageState::NotStarted, Some(fetcher)) => fetcher,
            (state, _) => {
                let _enter = span.enter();
                error!(state = ?state, "Stage: {} cannot be started again", STAGE_NAME);
                return Err(IngestionError::AlreadyRun(state));
            }
        };

        async {
            self.state = StageState::Running;
            info!("Stage: {} started", STAGE_NAME);
            match run_stage(&self.documents, fetcher, &self.span).await {
                Ok(report) => {
                    self.state = StageState::Completed;
                    info!(
                        archive = %report.archive.display(),
                        files = report.files_extracted,
                        "Stage: {} completed successfully.",
                        STAGE_NAME
                    );
                    Ok(report)
                }
                Err(e) => {
                    self.state = StageState::Failed;
                    error!(kind = ?e.kind(), "Error in {}: {}", STAGE_NAME, e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

async fn run_stage<F: Fetcher>(
    documents: &DocumentPaths,
    fetcher: F,
    span: &Span,
) -> Result<IngestionReport, IngestionError> {
    let manager =
        ConfigurationManager::new(documents.config.as_deref(), documents.params.as_deref())?;
    if manager.params().is_empty() {
        warn!("Params document has no entries");
    }
    debug!(
        artifact_root = %manager.config().artifact_root.display(),
        params = manager.params().len(),
        "Configuration resolved"
    );
    let config = manager.get_data_ingestion_config()?;

    let ingestion = DataIngestion::new(config, fetcher, span.clone());
    let archive = ingestion.download_file().await?;
    info!("Extracting data...");
    let files_extracted = ingestion.extract_zip_file()?;

    Ok(IngestionReport {
        archive_size: size_or_unknown(&archive),
        archive,
        unzip_dir: ingestion.config().unzip_dir.clone(),
        files_extracted,
    })
}

fn size_or_unknown(path: &Path) -> String {
    get_size(path).unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockFetcher;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_config_fails_and_cannot_rerun() {
        let tmp = tempdir().unwrap();
        let documents = DocumentPaths {
            config: Some(tmp.path().join("missing.yaml")),
            params: Some(tmp.path().join("params.yaml")),
        };
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().never();

        let mut pipeline = DataIngestionPipeline::new(documents, fetcher, &Span::none());
        assert_eq!(pipeline.state(), StageState::NotStarted);

        let err = pipeline.run().await.expect_err("missing config must fail");
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(pipeline.state(), StageState::Failed);

        let again = pipeline.run().await.expect_err("second run is refused");
        assert!(matches!(again, IngestionError::AlreadyRun(StageState::Failed)));
    }

    #[tokio::test]
    async fn test_corrupt_download_is_an_archive_failure() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("artifacts");
        let config_path = tmp.path().join("config.yaml");
        let params_path = tmp.path().join("params.yaml");
        fs::write(
            &config_path,
            format!(
                "artifact_root: {root}\ndata_ingestion:\n  root_dir: {root}/data_ingestion\n  source_url: https://drive.google.com/file/d/XYZ/view\n  local_data_file: {root}/data_ingestion/data.zip\n  unzip_dir: {root}/data_ingestion\n",
                root = root.display()
            ),
        )
        .unwrap();
        fs::write(&params_path, "EPOCHS: 1\n").unwrap();

        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_| {
            Ok(crate::contract::FetchedResponse::from_bytes(
                200,
                Some("application/octet-stream"),
                &b"definitely not a zip"[..],
            ))
        });

        let mut pipeline = DataIngestionPipeline::new(
            DocumentPaths {
                config: Some(config_path),
                params: Some(params_path),
            },
            fetcher,
            &Span::none(),
        );
        let err = pipeline.run().await.expect_err("corrupt archive must fail");
        assert_eq!(err.kind(), ErrorKind::Archive);
        assert_eq!(pipeline.state(), StageState::Failed);
        assert!(
            root.join("data_ingestion/data.zip").exists(),
            "partial download is left in place"
        );
    }

    #[tokio::test]
    async fn test_empty_params_document_is_warned_about() {
        use crate::logging::{build_subscriber, LogSettings};

        let tmp = tempdir().unwrap();
        let root = tmp.path().join("artifacts");
        let config_path = tmp.path().join("config.yaml");
        let params_path = tmp.path().join("params.yaml");
        fs::write(
            &config_path,
            format!(
                "artifact_root: {root}\ndata_ingestion:\n  root_dir: {root}/data_ingestion\n  source_url: https://example.com/data.zip\n  local_data_file: {root}/data_ingestion/data.zip\n  unzip_dir: {root}/data_ingestion\n",
                root = root.display()
            ),
        )
        .unwrap();
        fs::write(&params_path, "{}\n").unwrap();

        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().never();

        let settings = LogSettings {
            log_dir: tmp.path().join("logs"),
            stdout: false,
            ..LogSettings::default()
        };
        let (subscriber, log_guard) = build_subscriber(&settings).unwrap();
        let default_guard = tracing::subscriber::set_default(subscriber);

        let mut pipeline = DataIngestionPipeline::new(
            DocumentPaths {
                config: Some(config_path),
                params: Some(params_path),
            },
            fetcher,
            &Span::none(),
        );
        let err = pipeline.run().await.expect_err("bad source URL must fail");

        drop(default_guard);
        drop(log_guard);

        assert_eq!(err.kind(), ErrorKind::Config);
        let log = fs::read_to_string(settings.log_file()).unwrap();
        assert!(log.contains("Params document has no entries"), "log was:\n{log}");
    }
}
