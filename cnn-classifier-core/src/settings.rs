//! YAML document loader.
//!
//! Documents are parsed straight into typed structs; an empty or `null`
//! document is rejected before deserialization so it never surfaces as a
//! confusing "missing field" error.

use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{error, info};

use crate::error::SettingsError;

/// Reads and parses the YAML file at `path` into `T`.
pub fn read_yaml<T, P>(path: P) -> Result<T, SettingsError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(config_path = %path.display(), "YAML file not found");
            return Err(SettingsError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            error!(error = ?e, config_path = %path.display(), "Failed to read YAML file");
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    if content.trim().is_empty() {
        error!(config_path = %path.display(), "YAML file is empty");
        return Err(SettingsError::Empty {
            path: path.to_path_buf(),
        });
    }

    let value: serde_yaml::Value = match serde_yaml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            error!(error = %e, config_path = %path.display(), "Failed to parse YAML file");
            return Err(SettingsError::Parse {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    if value.is_null() {
        error!(config_path = %path.display(), "YAML file is empty");
        return Err(SettingsError::Empty {
            path: path.to_path_buf(),
        });
    }

    match serde_yaml::from_value(value) {
        Ok(doc) => {
            info!(config_path = %path.display(), "YAML file '{}' loaded successfully.", path.display());
            Ok(doc)
        }
        Err(e) => {
            error!(error = %e, config_path = %path.display(), "YAML file does not match the expected schema");
            Err(SettingsError::Parse {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}
