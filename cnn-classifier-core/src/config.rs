use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Default location of the pipeline-config document.
pub const CONFIG_FILE_PATH: &str = "config/config.yaml";
/// Default location of the params document.
pub const PARAMS_FILE_PATH: &str = "params.yaml";

/// The pipeline-config document: directory layout and data-source locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub artifact_root: PathBuf,
    pub data_ingestion: DataIngestionSection,
}

/// `data_ingestion` section of [`PipelineConfig`], as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataIngestionSection {
    pub root_dir: PathBuf,
    pub source_url: String,
    pub local_data_file: PathBuf,
    pub unzip_dir: PathBuf,
}

impl PipelineConfig {
    pub fn trace_loaded(&self) {
        info!(
            artifact_root = %self.artifact_root.display(),
            source_url = %self.data_ingestion.source_url,
            "Loaded pipeline config"
        );
        debug!(?self, "Pipeline config loaded (full debug)");
    }
}

/// Hyperparameters. Free-form: no stage in this crate reads them yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(pub serde_yaml::Mapping);

impl Params {
    /// Looks up a top-level key and deserializes it into `T`.
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .cloned()
            .and_then(|v| serde_yaml::from_value(v).ok())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolved configuration for the data ingestion stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataIngestionConfig {
    pub root_dir: PathBuf,
    /// Source URL of the archive.
    pub source_dir: String,
    /// Where the downloaded archive is written.
    pub local_data_file: PathBuf,
    /// Where the archive is extracted.
    pub unzip_dir: PathBuf,
}

impl From<&DataIngestionSection> for DataIngestionConfig {
    fn from(section: &DataIngestionSection) -> Self {
        DataIngestionConfig {
            root_dir: section.root_dir.clone(),
            source_dir: section.source_url.clone(),
            local_data_file: section.local_data_file.clone(),
            unzip_dir: section.unzip_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_typed_lookup() {
        let params: Params =
            serde_yaml::from_str("EPOCHS: 10\nIMAGE_SIZE: [224, 224, 3]\nAUGMENTATION: true\n")
                .unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get::<u32>("EPOCHS"), Some(10));
        assert_eq!(params.get::<Vec<u32>>("IMAGE_SIZE"), Some(vec![224, 224, 3]));
        assert_eq!(params.get::<bool>("AUGMENTATION"), Some(true));
        assert_eq!(params.get::<u32>("LEARNING_RATE"), None);
    }

    #[test]
    fn test_unknown_section_key_is_rejected() {
        let yaml = r#"
artifact_root: artifacts
data_ingestion:
  root_dir: artifacts/data_ingestion
  source_url: https://drive.google.com/file/d/abc/view
  local_data_file: artifacts/data_ingestion/data.zip
  unzip_dir: artifacts/data_ingestion
  checksum: deadbeef
"#;
        let res: Result<PipelineConfig, _> = serde_yaml::from_str(yaml);
        assert!(res.is_err(), "unknown keys must not be silently accepted");
    }
}
