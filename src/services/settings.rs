//! Settings service

use rust_decimal::Decimal;
use validator::Validate;

use super::uploads::FileStorage;
use crate::{
    error::{AppError, AppResult},
    models::settings::{Settings, UpdateSettings},
    repository::Repository,
};

#[derive(Clone)]
pub struct SettingsService {
    repository: Repository,
    storage: FileStorage,
}

impl SettingsService {
    pub fn new(repository: Repository, storage: FileStorage) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Current settings, created with defaults on first access
    pub async fn get(&self) -> AppResult<Settings> {
        self.repository.settings.get_or_create().await
    }

    pub async fn update(&self, patch: &UpdateSettings) -> AppResult<Settings> {
        patch.validate()?;
        if let Some(rate) = patch.tax_rate {
            if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                return Err(AppError::Validation(
                    "Tax rate must be between 0 and 100".to_string(),
                ));
            }
        }

        let settings = self.repository.settings.update(patch).await?;
        tracing::info!("Settings updated");
        Ok(settings)
    }

    /// Store a new company logo and record its public path
    pub async fn upload_logo(&self, file_name: &str, bytes: &[u8]) -> AppResult<Settings> {
        let path = self.storage.store_image(file_name, bytes).await?;
        self.repository.settings.set_logo_path(&path).await
    }
}
