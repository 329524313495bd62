//! Resolves the on-disk documents into per-stage configuration.

use std::path::Path;
use tracing::info;

use crate::config::{
    DataIngestionConfig, Params, PipelineConfig, CONFIG_FILE_PATH, PARAMS_FILE_PATH,
};
use crate::error::{IngestionError, PathError};
use crate::paths::create_directories;
use crate::settings::read_yaml;

/// Holds the loaded pipeline-config and params documents for one run.
#[derive(Debug)]
pub struct ConfigurationManager {
    config: PipelineConfig,
    params: Params,
}

impl ConfigurationManager {
    /// Loads both documents (falling back to [`CONFIG_FILE_PATH`] and
    /// [`PARAMS_FILE_PATH`]) and creates the artifact root.
    pub fn new(
        config_path: Option<&Path>,
        params_path: Option<&Path>,
    ) -> Result<Self, IngestionError> {
        let config_path = config_path.unwrap_or_else(|| Path::new(CONFIG_FILE_PATH));
        let params_path = params_path.unwrap_or_else(|| Path::new(PARAMS_FILE_PATH));
        info!(
            config_path = %config_path.display(),
            params_path = %params_path.display(),
            "Loading configuration"
        );

        let config: PipelineConfig = read_yaml(config_path)?;
        let params: Params = read_yaml(params_path)?;
        config.trace_loaded();

        create_directories(&[&config.artifact_root], true)?;

        Ok(ConfigurationManager { config, params })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Creates the ingestion root directory and returns the stage config.
    pub fn get_data_ingestion_config(&self) -> Result<DataIngestionConfig, PathError> {
        let section = &self.config.data_ingestion;
        create_directories(&[&section.root_dir], true)?;
        Ok(DataIngestionConfig::from(section))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettingsError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_docs(root: &Path, config_yaml: &str) -> (PathBuf, PathBuf) {
        let config_path = root.join("config.yaml");
        let params_path = root.join("params.yaml");
        fs::write(&config_path, config_yaml).unwrap();
        fs::write(&params_path, "EPOCHS: 1\nBATCH_SIZE: 16\n").unwrap();
        (config_path, params_path)
    }

    #[test]
    fn test_ingestion_config_matches_document_verbatim() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let artifact_root = root.join("artifacts");
        let ingestion_root = artifact_root.join("data_ingestion");
        let yaml = format!(
            "artifact_root: {}\ndata_ingestion:\n  root_dir: {}\n  source_url: https://drive.google.com/file/d/1A2b3C4d5E/view?usp=sharing\n  local_data_file: {}\n  unzip_dir: {}\n",
            artifact_root.display(),
            ingestion_root.display(),
            ingestion_root.join("data.zip").display(),
            ingestion_root.display(),
        );
        let (config_path, params_path) = write_docs(root, &yaml);

        let manager = ConfigurationManager::new(Some(&config_path), Some(&params_path))
            .expect("configuration should load");
        assert!(artifact_root.is_dir(), "artifact root is created on load");
        assert_eq!(manager.params().get::<u32>("BATCH_SIZE"), Some(16));
        assert_eq!(manager.params().len(), 2);
        assert_eq!(manager.config().artifact_root, artifact_root);

        let ingestion = manager
            .get_data_ingestion_config()
            .expect("ingestion config should resolve");
        assert!(ingestion_root.is_dir(), "ingestion root is created on resolve");

        assert_eq!(ingestion.root_dir, ingestion_root);
        assert_eq!(
            ingestion.source_dir,
            "https://drive.google.com/file/d/1A2b3C4d5E/view?usp=sharing"
        );
        assert_eq!(ingestion.local_data_file, ingestion_root.join("data.zip"));
        assert_eq!(ingestion.unzip_dir, ingestion_root);
    }

    #[test]
    fn test_missing_section_field_fails_closed() {
        let tmp = tempdir().unwrap();
        let yaml = format!(
            "artifact_root: {}\ndata_ingestion:\n  root_dir: x\n  source_url: y\n  local_data_file: z\n",
            tmp.path().join("artifacts").display()
        );
        let (config_path, params_path) = write_docs(tmp.path(), &yaml);

        let err = ConfigurationManager::new(Some(&config_path), Some(&params_path))
            .expect_err("unzip_dir is required");
        assert!(matches!(
            err,
            IngestionError::Config(SettingsError::Parse { .. })
        ));
        assert!(
            !tmp.path().join("artifacts").exists(),
            "nothing is created for an invalid document"
        );
    }

    #[test]
    fn test_missing_params_document_is_reported() {
        let tmp = tempdir().unwrap();
        let config_path = tmp.path().join("config.yaml");
        fs::write(
            &config_path,
            "artifact_root: a\ndata_ingestion:\n  root_dir: a/b\n  source_url: u\n  local_data_file: a/b/c.zip\n  unzip_dir: a/b\n",
        )
        .unwrap();

        let err = ConfigurationManager::new(
            Some(&config_path),
            Some(&tmp.path().join("params.yaml")),
        )
        .expect_err("params document is required");
        assert!(matches!(
            err,
            IngestionError::Config(SettingsError::NotFound { .. })
        ));
    }
}
