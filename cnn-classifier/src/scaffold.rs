//! Project skeleton: the directories and placeholder files a fresh checkout
//! of the classifier project is expected to have.

use anyhow::{Context, Result};
use cnn_classifier_core::paths::create_directories;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Files of the skeleton, relative to the project root.
pub fn project_files() -> Vec<PathBuf> {
    [
        ".github/workflows/.gitkeep",
        "config/config.yaml",
        "params.yaml",
        "dvc.yaml",
        "notebook/trials.ipynb",
        "templates/index.html",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

#[derive(Debug, Default)]
pub struct ScaffoldReport {
    pub created: Vec<PathBuf>,
    /// Non-empty files that were left untouched.
    pub existing: Vec<PathBuf>,
}

/// Creates every file in `files` under `root`, with its parent directories.
///
/// A file is (re)created empty when it is missing or zero-sized; files with
/// content are never touched.
pub fn create_file_structure(root: &Path, files: &[PathBuf]) -> Result<ScaffoldReport> {
    let mut report = ScaffoldReport::default();

    for file in files {
        let path = root.join(file);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_directories(&[dir], false)?;
            info!(dir = %dir.display(), file = %file_name, "Created directory: {} for the file: {}", dir.display(), file_name);
        }

        let is_empty = match fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        if is_empty {
            fs::write(&path, b"")
                .with_context(|| format!("Failed to create file {}", path.display()))?;
            info!(path = %path.display(), "Created empty file: {}", path.display());
            report.created.push(path);
        } else {
            info!(path = %path.display(), "{} already exists", file_name);
            report.existing.push(path);
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_skeleton_and_keeps_existing_content() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("params.yaml"), "EPOCHS: 5\n").unwrap();

        let report = create_file_structure(tmp.path(), &project_files()).unwrap();

        assert_eq!(report.existing, vec![tmp.path().join("params.yaml")]);
        assert_eq!(report.created.len(), project_files().len() - 1);
        for file in project_files() {
            assert!(tmp.path().join(&file).is_file(), "{} missing", file.display());
        }
        assert_eq!(
            fs::read_to_string(tmp.path().join("params.yaml")).unwrap(),
            "EPOCHS: 5\n"
        );
    }

    #[test]
    fn test_zero_sized_files_count_as_missing() {
        let tmp = tempdir().unwrap();
        let files = vec![PathBuf::from("config/config.yaml")];
        create_file_structure(tmp.path(), &files).unwrap();

        let again = create_file_structure(tmp.path(), &files).unwrap();
        assert_eq!(again.created, vec![tmp.path().join("config/config.yaml")]);
        assert!(again.existing.is_empty());
    }
}
