//! Deployment artifacts (zip archives) prepared for upload

use crate::error::{LaunchpadError, LaunchpadResult};
use crate::http::FilePart;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Local file header signature of a zip archive
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Form field the upload endpoint expects the archive under
pub const ARTIFACT_FIELD: &str = "file";

/// A validated zip archive read into memory
#[derive(Debug, Clone)]
pub struct Artifact {
    path: PathBuf,
    file_name: String,
    data: Vec<u8>,
    sha256: String,
}

impl Artifact {
    /// Read and validate the archive at `path`
    pub async fn load(path: &Path) -> LaunchpadResult<Self> {
        if !path.exists() {
            return Err(LaunchpadError::PathNotFound(path.to_path_buf()));
        }

        let invalid = |reason: &str| LaunchpadError::ArtifactInvalid {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| invalid("file name is not valid UTF-8"))?
            .to_string();

        if !file_name.to_lowercase().ends_with(".zip") {
            return Err(invalid("expected a .zip archive"));
        }

        let data = fs::read(path)
            .await
            .map_err(|e| LaunchpadError::io(format!("reading {}", path.display()), e))?;

        if data.is_empty() {
            return Err(invalid("file is empty"));
        }
        if !data.starts_with(ZIP_MAGIC) {
            return Err(invalid("not a zip archive"));
        }

        let sha256 = hex::encode(Sha256::digest(&data));
        debug!("Loaded artifact {} ({} bytes, sha256 {})", file_name, data.len(), sha256);

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            data,
            sha256,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Hex-encoded SHA-256 of the archive
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Multipart part carrying the archive
    pub fn to_part(&self) -> FilePart {
        FilePart {
            field: ARTIFACT_FIELD.to_string(),
            file_name: self.file_name.clone(),
            content_type: "application/zip".to_string(),
            data: self.data.clone(),
        }
    }
}
