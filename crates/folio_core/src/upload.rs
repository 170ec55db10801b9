//! Image upload collaborator: store bytes, get back an image reference.
//!
//! # Responsibility
//! - Enforce the upload size limit before anything is encoded or written.
//! - Return a string usable directly as a portfolio `image` field.
//!
//! # Invariants
//! - Oversized input is rejected with a message fit for the admin user.
//! - Callers cannot tell a data URI from a stored-file URL; both are opaque.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Default upload limit (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File too large. Max {}MB allowed.", .max_bytes / (1024 * 1024))]
    TooLarge { size: u64, max_bytes: u64 },
    #[error("failed to store upload at `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stores an uploaded image and returns its reference.
pub trait ImageUploader {
    fn upload_image(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError>;
}

/// Embeds uploads inline as `data:` URIs.
#[derive(Debug, Clone)]
pub struct DataUriUploader {
    max_bytes: u64,
}

impl DataUriUploader {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl Default for DataUriUploader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl ImageUploader for DataUriUploader {
    fn upload_image(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        ensure_within_limit(bytes, self.max_bytes)?;
        let mime = mime_for(file_name);
        Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }
}

/// Writes uploads to a directory under random names.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    root: PathBuf,
    public_prefix: String,
    max_bytes: u64,
}

impl DirectoryUploader {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
            max_bytes,
        }
    }
}

impl ImageUploader for DirectoryUploader {
    fn upload_image(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        ensure_within_limit(bytes, self.max_bytes)?;
        fs::create_dir_all(&self.root).map_err(|source| UploadError::Io {
            path: self.root.clone(),
            source,
        })?;

        let stored_name = match extension_of(file_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        let path = self.root.join(&stored_name);
        fs::write(&path, bytes).map_err(|source| UploadError::Io {
            path: path.clone(),
            source,
        })?;

        info!(
            "event=image_upload module=upload status=ok bytes={} stored={stored_name}",
            bytes.len()
        );
        Ok(format!(
            "{}/{stored_name}",
            self.public_prefix.trim_end_matches('/')
        ))
    }
}

fn ensure_within_limit(bytes: &[u8], max_bytes: u64) -> Result<(), UploadError> {
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(UploadError::TooLarge { size, max_bytes });
    }
    Ok(())
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

fn mime_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}
