//! Inline image ingestion
//!
//! Profile photos arrive either as a reference the serving layer can already
//! resolve (an `http(s)` URL or a `/static` path) or as base64 data, with or
//! without a `data:image/...;base64,` prefix. Inline data is written to the
//! upload directory under a fresh name and replaced by its public path.

use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::info;
use uuid::Uuid;

use crate::models::UserId;

/// Prefix of assets served by this deployment
pub const LOCAL_ASSET_PREFIX: &str = "/static";

const INLINE_MARKER: &str = "base64,";
const IMAGE_EXTENSION: &str = "png";

/// Errors raised while ingesting inline image data
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Invalid base64 image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Image payload decoded to zero bytes")]
    Empty,

    #[error("Failed to store image at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file written by the ingestor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImageReference {
    pub filename: String,
    /// Public path handed back to clients
    pub path: String,
}

/// Outcome of [`ImageIngestor::ingest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestedImage {
    Stored(StoredImageReference),
    Passthrough(String),
}

impl IngestedImage {
    /// Reference to persist in the user record
    pub fn into_reference(self) -> String {
        match self {
            IngestedImage::Stored(stored) => stored.path,
            IngestedImage::Passthrough(reference) => reference,
        }
    }
}

/// Writes inline images to a public upload directory
#[derive(Debug, Clone)]
pub struct ImageIngestor {
    upload_dir: PathBuf,
    public_prefix: String,
}

impl ImageIngestor {
    pub fn new(upload_dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// Whether the payload is already a resolvable reference
    pub fn is_passthrough(payload: &str) -> bool {
        payload.starts_with("http") || payload.starts_with(LOCAL_ASSET_PREFIX)
    }

    /// Store `payload` for `user_id`, or hand it back untouched when it is
    /// already a reference.
    pub async fn ingest(&self, payload: &str, user_id: UserId) -> Result<IngestedImage, ImageError> {
        if Self::is_passthrough(payload) {
            return Ok(IngestedImage::Passthrough(payload.to_string()));
        }

        let encoded = payload
            .split_once(INLINE_MARKER)
            .map_or(payload, |(_, data)| data);
        // Wrapped payloads carry line breaks inside the data
        let encoded: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD.decode(encoded)?;
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let filename = format!(
            "profile_{}_{}.{}",
            user_id,
            Uuid::new_v4(),
            IMAGE_EXTENSION
        );
        let path = self.upload_dir.join(&filename);

        fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|source| ImageError::Write {
                path: self.upload_dir.clone(),
                source,
            })?;
        write_new_file(&path, &bytes)
            .await
            .map_err(|source| ImageError::Write {
                path: path.clone(),
                source,
            })?;

        info!("Stored profile image {} ({} bytes)", filename, bytes.len());

        Ok(IngestedImage::Stored(StoredImageReference {
            path: format!("{}/{}", self.public_prefix, filename),
            filename,
        }))
    }
}

/// Write `bytes` to a file that must not exist yet
async fn write_new_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await
}
