//! Image Upload Storage
//! Mission: Validate and persist product images under the uploads directory

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Maximum accepted image payload: 5 MB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Public URL prefix the stored references resolve under.
const PUBLIC_PREFIX: &str = "/uploads";

/// Map an allow-listed image content type to its file extension.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Upload rejection reasons. Validation failures map to 400 at the API
/// boundary; I/O failures are upstream faults.
#[derive(Debug)]
pub enum ImageError {
    UnsupportedType(String),
    TooLarge(usize),
    Io(anyhow::Error),
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::UnsupportedType(ct) => {
                write!(f, "Unsupported image type: {ct} (allowed: jpeg, png, webp)")
            }
            ImageError::TooLarge(size) => {
                write!(f, "Image too large: {size} bytes (max {MAX_IMAGE_BYTES})")
            }
            ImageError::Io(e) => write!(f, "Failed to store image: {e}"),
        }
    }
}

impl std::error::Error for ImageError {}

/// Local filesystem image store
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Create the store, ensuring the uploads directory exists
    pub fn new(dir: &str) -> Result<Self> {
        let dir = PathBuf::from(dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create uploads dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Validate an upload without touching the filesystem. Returns the file
    /// extension for the content type.
    pub fn validate(content_type: &str, size: usize) -> Result<&'static str, ImageError> {
        let ext = extension_for(content_type)
            .ok_or_else(|| ImageError::UnsupportedType(content_type.to_string()))?;
        if size > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge(size));
        }
        Ok(ext)
    }

    /// Store validated image bytes and return the public reference to embed
    /// in the product record.
    pub fn save(&self, bytes: &[u8], content_type: &str) -> Result<String, ImageError> {
        let ext = Self::validate(content_type, bytes.len())?;

        // Collision-resistant name: unix millis + random suffix.
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        let filename = format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, ext);

        let path = self.dir.join(&filename);
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))
            .map_err(ImageError::Io)?;

        info!("Stored image {} ({} bytes)", filename, bytes.len());

        Ok(format!("{PUBLIC_PREFIX}/{filename}"))
    }
}
