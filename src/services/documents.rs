//! Document export service

use std::sync::Arc;

use chrono::Utc;

use crate::{
    documents::{DocumentRenderer, DocumentSnapshot, PdfRenderer},
    error::AppResult,
    repository::Repository,
};

/// A rendered file ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct DocumentsService {
    repository: Repository,
    renderer: Arc<dyn DocumentRenderer>,
}

impl DocumentsService {
    pub fn new(repository: Repository) -> Self {
        Self::with_renderer(repository, Arc::new(PdfRenderer::default()))
    }

    pub fn with_renderer(repository: Repository, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self {
            repository,
            renderer,
        }
    }

    pub async fn quotation(&self, id: i32) -> AppResult<RenderedDocument> {
        let quotation = self.repository.quotations.get_by_id(id).await?;
        let settings = self.repository.settings.get_or_create().await?;
        let snapshot =
            DocumentSnapshot::from_quotation(&quotation, &settings, Utc::now().date_naive());
        self.render(&snapshot)
    }

    /// Rental agreement for a booking
    pub async fn booking(&self, id: i32) -> AppResult<RenderedDocument> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        let settings = self.repository.settings.get_or_create().await?;
        let customer = match booking.customer_id {
            Some(customer_id) => self.repository.customers.get_by_id(customer_id).await.ok(),
            None => None,
        };
        let snapshot = DocumentSnapshot::from_booking(
            &booking,
            customer.as_ref(),
            &settings,
            Utc::now().date_naive(),
        );
        self.render(&snapshot)
    }

    fn render(&self, snapshot: &DocumentSnapshot) -> AppResult<RenderedDocument> {
        let bytes = self.renderer.render(snapshot)?;
        tracing::debug!(code = %snapshot.code, size = bytes.len(), "Rendered document");
        Ok(RenderedDocument {
            file_name: format!("{}.{}", snapshot.code, self.renderer.extension()),
            content_type: self.renderer.content_type(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_missing_quotation_is_not_found() {
        let service = DocumentsService::new(Repository::in_memory());
        assert!(matches!(
            service.quotation(42).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.booking(42).await, Err(AppError::NotFound(_))));
    }
}
