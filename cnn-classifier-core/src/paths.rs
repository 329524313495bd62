use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::error::PathError;

/// Creates every directory in `paths` (parents included), in order.
///
/// Directories that already exist are left alone. With `verbose`, one entry
/// per directory is logged.
pub fn create_directories<P: AsRef<Path>>(paths: &[P], verbose: bool) -> Result<(), PathError> {
    for path in paths {
        let path = path.as_ref();
        if let Err(e) = fs::create_dir_all(path) {
            error!(error = ?e, path = %path.display(), "An error occurred while creating directories");
            return Err(PathError::Create {
                path: path.to_path_buf(),
                source: e,
            });
        }
        if verbose {
            info!(path = %path.display(), "Created directory at: {}", path.display());
        }
    }
    Ok(())
}
