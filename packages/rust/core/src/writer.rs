//! Writes the generated parallels JSON.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use parallels_shared::{ParallelMap, ParallelsError, Result};

/// Metadata for the file written by [`write_parallels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    pub path: PathBuf,
    pub size_bytes: usize,
    /// Hex-encoded SHA-256 of the file contents.
    pub sha256: String,
}

/// Serialize `parallels` and write it to `path`, replacing any existing file.
///
/// The JSON is written to a temp file next to `path` and renamed into place,
/// so readers never observe a partial file.
#[instrument(skip_all, fields(path = %path.display(), records = parallels.len()))]
pub fn write_parallels(path: &Path, parallels: &ParallelMap, pretty: bool) -> Result<WrittenOutput> {
    let json = if pretty {
        serde_json::to_string_pretty(parallels)
    } else {
        serde_json::to_string(parallels)
    }
    .map_err(|e| ParallelsError::Serialization(e.to_string()))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| ParallelsError::config(format!("output path {} has no file name", path.display())))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ParallelsError::io(parent, e))?;
    }

    let temp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));
    std::fs::write(&temp, &json).map_err(|e| ParallelsError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| ParallelsError::io(path, e))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    debug!(size = json.len(), %sha256, "wrote parallels JSON");

    Ok(WrittenOutput {
        path: path.to_path_buf(),
        size_bytes: json.len(),
        sha256,
    })
}
