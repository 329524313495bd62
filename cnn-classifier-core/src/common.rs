//! Small file helpers shared by the pipeline stages: JSON documents, raw
//! binary blobs, file sizes and base64-encoded images.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

use crate::error::CommonError;

fn io_error(path: &Path, e: std::io::Error) -> CommonError {
    if e.kind() == ErrorKind::NotFound {
        CommonError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        CommonError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

/// Writes `data` as pretty-printed JSON (4-space indent) to `path`.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), CommonError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if let Err(e) = data.serialize(&mut ser) {
        error!(error = %e, path = %path.display(), "Error serializing JSON data");
        return Err(CommonError::Json {
            path: path.to_path_buf(),
            source: e,
        });
    }

    if let Err(e) = fs::write(path, &buf) {
        error!(error = ?e, path = %path.display(), "Error saving JSON data");
        return Err(io_error(path, e));
    }
    info!(path = %path.display(), "JSON data saved to: {}", path.display());
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, CommonError> {
    let content = fs::read(path).map_err(|e| {
        error!(error = ?e, path = %path.display(), "JSON file could not be read");
        io_error(path, e)
    })?;
    match serde_json::from_slice(&content) {
        Ok(data) => {
            info!(path = %path.display(), "JSON data loaded successfully from path: {}", path.display());
            Ok(data)
        }
        Err(e) => {
            error!(error = %e, path = %path.display(), "Error decoding JSON data");
            Err(CommonError::Json {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}

pub fn save_bin(data: &[u8], path: &Path) -> Result<(), CommonError> {
    if let Err(e) = fs::write(path, data) {
        error!(error = ?e, path = %path.display(), "Error saving binary data");
        return Err(io_error(path, e));
    }
    info!(path = %path.display(), bytes = data.len(), "Binary data saved successfully");
    Ok(())
}

pub fn load_bin(path: &Path) -> Result<Vec<u8>, CommonError> {
    match fs::read(path) {
        Ok(data) => {
            info!(path = %path.display(), bytes = data.len(), "Binary data loaded successfully");
            Ok(data)
        }
        Err(e) => {
            error!(error = ?e, path = %path.display(), "Error loading binary data");
            Err(io_error(path, e))
        }
    }
}

/// Size of the file at `path` in kilobytes, rounded, formatted as `~N KB`.
pub fn get_size(path: &Path) -> Result<String, CommonError> {
    let meta = fs::metadata(path).map_err(|e| io_error(path, e))?;
    let kb = (meta.len() as f64 / 1024.0).round() as u64;
    Ok(format!("~{kb} KB"))
}

/// Decodes a base64 image and writes the bytes to `file_name`.
pub fn decode_image(encoded_image: &str, file_name: &Path) -> Result<(), CommonError> {
    let img = STANDARD.decode(encoded_image.trim())?;
    fs::write(file_name, img).map_err(|e| io_error(file_name, e))
}

pub fn encode_image_into_base64(image_path: &Path) -> Result<String, CommonError> {
    let img = fs::read(image_path).map_err(|e| io_error(image_path, e))?;
    Ok(STANDARD.encode(img))
}
