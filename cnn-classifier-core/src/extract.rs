use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, error, info};

use crate::contract::Fetcher;
use crate::download::DataIngestion;
use crate::error::ExtractError;
use crate::paths::create_directories;

/// Extracts every entry of the zip archive at `archive` into `dest`.
///
/// Existing files are overwritten. Returns the number of files written.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, ExtractError> {
    create_directories(&[dest], false)?;

    let file = File::open(archive).map_err(|e| ExtractError::Open {
        path: archive.to_path_buf(),
        source: e,
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| ExtractError::Archive {
        path: archive.to_path_buf(),
        source: e,
    })?;

    let mut extracted = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| ExtractError::Archive {
            path: archive.to_path_buf(),
            source: e,
        })?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(ExtractError::UnsafeEntry {
                name: entry.name().to_string(),
            });
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            create_directories(&[&out_path], false)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            create_directories(&[parent], false)?;
        }

        let write_error = |e| ExtractError::Write {
            path: out_path.clone(),
            source: e,
        };
        let mut out = File::create(&out_path).map_err(write_error)?;
        io::copy(&mut entry, &mut out).map_err(write_error)?;
        debug!(path = %out_path.display(), "Extracted archive entry");
        extracted += 1;
    }
    Ok(extracted)
}

impl<F: Fetcher> DataIngestion<F> {
    /// Extracts `local_data_file` into `unzip_dir`.
    pub fn extract_zip_file(&self) -> Result<usize, ExtractError> {
        self.span.in_scope(|| {
            let archive = &self.config.local_data_file;
            let unzip_dir = &self.config.unzip_dir;
            match extract_zip(archive, unzip_dir) {
                Ok(count) => {
                    info!(
                        archive = %archive.display(),
                        unzip_dir = %unzip_dir.display(),
                        files = count,
                        "Extracted archive"
                    );
                    Ok(count)
                }
                Err(e) => {
                    error!(error = %e, archive = %archive.display(), "Error during archive extraction: {}", e);
                    Err(e)
                }
            }
        })
    }
}
