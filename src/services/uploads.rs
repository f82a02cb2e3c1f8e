//! Local file storage for uploaded images

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{
    config::UploadsConfig,
    error::{AppError, AppResult},
};

/// Public URL prefix the upload directory is served under
pub const PUBLIC_PREFIX: &str = "/uploads";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

#[derive(Clone)]
pub struct FileStorage {
    dir: PathBuf,
    max_bytes: usize,
}

impl FileStorage {
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            max_bytes: config.max_bytes,
        }
    }

    /// Store an image under a fresh name and return its public path
    /// (`/uploads/<uuid>.<ext>`).
    pub async fn store_image(&self, original_name: &str, bytes: &[u8]) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        let extension = image_extension(original_name).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unsupported file type, expected one of: {}",
                IMAGE_EXTENSIONS.join(", ")
            ))
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {}", e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.dir.join(&file_name), bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write upload: {}", e)))?;

        tracing::info!(file = %file_name, size = bytes.len(), "Stored upload");
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }
}

/// Lower-cased extension when it is an accepted image type
fn image_extension(name: &str) -> Option<String> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}
