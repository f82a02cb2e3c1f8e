//! Quotation lifecycle service

use validator::Validate;

use super::{ensure_date_range, identifiers::IdentifierGenerator, load_line_equipment};
use crate::{
    error::{AppError, AppResult},
    identifiers::IdentifierKind,
    models::quotation::{CreateQuotation, NewQuotation, Quotation, QuotationItem, QuotationStatus},
    pricing::{price_lines, round_money},
    repository::Repository,
};

#[derive(Clone)]
pub struct QuotationsService {
    repository: Repository,
    identifiers: IdentifierGenerator,
}

impl QuotationsService {
    pub fn new(repository: Repository, identifiers: IdentifierGenerator) -> Self {
        Self {
            repository,
            identifiers,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Quotation>> {
        self.repository.quotations.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Quotation> {
        self.repository.quotations.get_by_id(id).await
    }

    /// Price and store a new Draft quotation.
    ///
    /// Every check runs before a code is reserved, so a rejected request
    /// leaves no trace.
    pub async fn create(&self, data: &CreateQuotation) -> AppResult<Quotation> {
        data.validate()?;
        ensure_date_range(data.start_date, data.end_date)?;

        let customer = self.repository.customers.get_by_id(data.customer_id).await?;
        let equipment = load_line_equipment(&self.repository, &data.items).await?;

        let breakdown = price_lines(
            data.items
                .iter()
                .zip(&equipment)
                .map(|(line, equipment)| (equipment.daily_rate, line.quantity)),
        )?;
        let items: Vec<QuotationItem> = breakdown
            .lines
            .iter()
            .zip(&equipment)
            .map(|(priced, equipment)| QuotationItem {
                equipment_id: equipment.id,
                name: equipment.name.clone(),
                quantity: priced.quantity,
                rate: round_money(priced.rate),
                subtotal: round_money(priced.subtotal),
            })
            .collect();

        let quotation_id = self.identifiers.next(IdentifierKind::Quotation).await?;
        let quotation = self
            .repository
            .quotations
            .insert(&NewQuotation {
                quotation_id,
                customer_id: Some(customer.id),
                customer_name: customer.name,
                customer_phone: Some(customer.phone).filter(|phone| !phone.is_empty()),
                start_date: data.start_date,
                end_date: data.end_date,
                items,
                total_amount: round_money(breakdown.total),
                status: QuotationStatus::Draft,
            })
            .await?;

        tracing::info!(
            quotation_id = %quotation.quotation_id,
            total = %quotation.total_amount,
            "Quotation created"
        );
        Ok(quotation)
    }

    /// Draft -> Sent
    pub async fn send(&self, id: i32) -> AppResult<Quotation> {
        self.transition(id, QuotationStatus::Sent).await
    }

    /// Draft | Sent -> Accepted
    pub async fn accept(&self, id: i32) -> AppResult<Quotation> {
        self.transition(id, QuotationStatus::Accepted).await
    }

    /// Draft | Sent -> Declined
    pub async fn decline(&self, id: i32) -> AppResult<Quotation> {
        self.transition(id, QuotationStatus::Declined).await
    }

    async fn transition(&self, id: i32, next: QuotationStatus) -> AppResult<Quotation> {
        let quotation = self.repository.quotations.get_by_id(id).await?;
        if !quotation.status.can_transition_to(next) {
            return Err(AppError::BusinessRule(format!(
                "Quotation {} cannot move from {} to {}",
                quotation.quotation_id, quotation.status, next
            )));
        }

        let updated = self
            .repository
            .quotations
            .set_status(id, quotation.status, next)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Quotation {} was modified concurrently",
                    quotation.quotation_id
                ))
            })?;

        tracing::info!(
            quotation_id = %updated.quotation_id,
            from = %quotation.status,
            to = %next,
            "Quotation status changed"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::models::customer::CreateCustomer;
    use crate::models::equipment::CreateEquipment;
    use crate::models::quotation::LineItemRequest;
    use crate::repository::memory::MemoryStore;
    use crate::repository::quotations::MockQuotationRepository;
    use crate::repository::sequences::MockSequenceRepository;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    async fn seeded() -> (Repository, i32, i32, i32) {
        let repository = Repository::from_memory(Arc::new(MemoryStore::new()));
        let customer = repository
            .customers
            .create(&CreateCustomer {
                name: "Nimal Perera".to_string(),
                phone: "0771234567".to_string(),
                national_id: "861234567V".to_string(),
                address: "12 Galle Road, Colombo".to_string(),
                email: None,
            })
            .await
            .unwrap();
        let mixer = repository
            .equipment
            .create(&CreateEquipment {
                name: "Concrete Mixer".to_string(),
                category: "Construction".to_string(),
                daily_rate: dec("2500.50"),
                weekly_rate: None,
                monthly_rate: None,
                status: None,
                description: None,
            })
            .await
            .unwrap();
        let scaffold = repository
            .equipment
            .create(&CreateEquipment {
                name: "Scaffolding Set".to_string(),
                category: "Construction".to_string(),
                daily_rate: dec("800"),
                weekly_rate: None,
                monthly_rate: None,
                status: None,
                description: None,
            })
            .await
            .unwrap();
        (repository, customer.id, mixer.id, scaffold.id)
    }

    fn service(repository: Repository) -> QuotationsService {
        QuotationsService::new(repository.clone(), IdentifierGenerator::new(repository))
    }

    #[tokio::test]
    async fn test_create_prices_items_and_starts_as_draft() {
        let (repository, customer_id, mixer, scaffold) = seeded().await;
        let service = service(repository);

        let quotation = service
            .create(&CreateQuotation {
                customer_id,
                start_date: None,
                end_date: None,
                items: vec![
                    LineItemRequest { equipment_id: mixer, quantity: 2 },
                    LineItemRequest { equipment_id: scaffold, quantity: 3 },
                ],
            })
            .await
            .unwrap();

        assert_eq!(quotation.status, QuotationStatus::Draft);
        assert_eq!(quotation.customer_name, "Nimal Perera");
        assert_eq!(quotation.items[0].subtotal, dec("5001.00"));
        assert_eq!(quotation.items[1].subtotal, dec("2400"));
        assert_eq!(quotation.total_amount, dec("7401.00"));
        assert!(quotation.quotation_id.starts_with("QT-"));
        assert!(quotation.quotation_id.ends_with("-001"));
    }

    #[tokio::test]
    async fn test_empty_items_persist_nothing() {
        let mut quotations = MockQuotationRepository::new();
        quotations.expect_insert().times(0);
        let mut sequences = MockSequenceRepository::new();
        sequences.expect_next_value().times(0);

        let mut repository = Repository::in_memory();
        repository.quotations = Arc::new(quotations);
        repository.sequences = Arc::new(sequences);
        let service = service(repository);

        let result = service
            .create(&CreateQuotation {
                customer_id: 1,
                start_date: None,
                end_date: None,
                items: vec![],
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_equipment_consumes_no_code() {
        let (repository, customer_id, mixer, _) = seeded().await;
        let service = service(repository.clone());

        let result = service
            .create(&CreateQuotation {
                customer_id,
                start_date: None,
                end_date: None,
                items: vec![
                    LineItemRequest { equipment_id: mixer, quantity: 1 },
                    LineItemRequest { equipment_id: 9999, quantity: 1 },
                ],
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let quotation = service
            .create(&CreateQuotation {
                customer_id,
                start_date: None,
                end_date: None,
                items: vec![LineItemRequest { equipment_id: mixer, quantity: 1 }],
            })
            .await
            .unwrap();
        assert!(quotation.quotation_id.ends_with("-001"));
        assert_eq!(repository.quotations.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_oversized_total_is_rejected_before_a_code_is_reserved() {
        let (repository, customer_id, mixer, _) = seeded().await;
        // Written straight to the store, as a legacy row could be
        let huge = repository
            .equipment
            .create(&CreateEquipment {
                name: "Tower Crane".to_string(),
                category: "Lifting".to_string(),
                daily_rate: dec("10000000000000000000000000000"),
                weekly_rate: None,
                monthly_rate: None,
                status: None,
                description: None,
            })
            .await
            .unwrap();
        let service = service(repository.clone());

        let overflowing = service
            .create(&CreateQuotation {
                customer_id,
                start_date: None,
                end_date: None,
                items: vec![LineItemRequest { equipment_id: huge.id, quantity: 100 }],
            })
            .await;
        assert!(matches!(overflowing, Err(AppError::Validation(_))));

        let mixer_rate = repository.equipment.get_by_id(mixer).await.unwrap().daily_rate;
        assert_eq!(mixer_rate, dec("2500.50"));
        let beyond_column = service
            .create(&CreateQuotation {
                customer_id,
                start_date: None,
                end_date: None,
                items: vec![
                    LineItemRequest { equipment_id: huge.id, quantity: 1 },
                    LineItemRequest { equipment_id: mixer, quantity: 1 },
                ],
            })
            .await;
        assert!(matches!(beyond_column, Err(AppError::Validation(_))));

        let quotation = service
            .create(&CreateQuotation {
                customer_id,
                start_date: None,
                end_date: None,
                items: vec![LineItemRequest { equipment_id: mixer, quantity: 1 }],
            })
            .await
            .unwrap();
        assert!(quotation.quotation_id.ends_with("-001"));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let (repository, customer_id, mixer, _) = seeded().await;
        let result = service(repository)
            .create(&CreateQuotation {
                customer_id,
                start_date: None,
                end_date: None,
                items: vec![LineItemRequest { equipment_id: mixer, quantity: 0 }],
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_lifecycle_guards() {
        let (repository, customer_id, mixer, _) = seeded().await;
        let service = service(repository);
        let request = CreateQuotation {
            customer_id,
            start_date: None,
            end_date: None,
            items: vec![LineItemRequest { equipment_id: mixer, quantity: 1 }],
        };

        let sent = service.create(&request).await.unwrap();
        let sent = service.send(sent.id).await.unwrap();
        assert_eq!(sent.status, QuotationStatus::Sent);
        assert!(matches!(service.send(sent.id).await, Err(AppError::BusinessRule(_))));
        let accepted = service.accept(sent.id).await.unwrap();
        assert_eq!(accepted.status, QuotationStatus::Accepted);
        assert!(matches!(service.decline(sent.id).await, Err(AppError::BusinessRule(_))));

        let draft = service.create(&request).await.unwrap();
        let declined = service.decline(draft.id).await.unwrap();
        assert_eq!(declined.status, QuotationStatus::Declined);
        assert!(matches!(service.accept(draft.id).await, Err(AppError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn test_lost_race_is_a_conflict() {
        let (repository, customer_id, mixer, _) = seeded().await;
        let created = service(repository.clone())
            .create(&CreateQuotation {
                customer_id,
                start_date: None,
                end_date: None,
                items: vec![LineItemRequest { equipment_id: mixer, quantity: 1 }],
            })
            .await
            .unwrap();

        let mut quotations = MockQuotationRepository::new();
        quotations
            .expect_get_by_id()
            .returning(move |_| Ok(created.clone()));
        quotations.expect_set_status().returning(|_, _, _| Ok(None));
        let mut repository = repository;
        repository.quotations = Arc::new(quotations);

        let result = service(repository).send(1).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
