//! Booking lifecycle service

use rust_decimal::Decimal;

use super::{ensure_date_range, identifiers::IdentifierGenerator, load_line_equipment};
use crate::{
    error::{AppError, AppResult},
    identifiers::IdentifierKind,
    models::{
        booking::{Booking, BookingItem, BookingStatus, CreateBooking, NewBooking},
        quotation::{Quotation, QuotationStatus},
    },
    pricing::{ensure_amount, ensure_quantity, price_lines, round_money},
    repository::Repository,
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    identifiers: IdentifierGenerator,
}

impl BookingsService {
    pub fn new(repository: Repository, identifiers: IdentifierGenerator) -> Self {
        Self {
            repository,
            identifiers,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Booking>> {
        self.repository.bookings.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Booking> {
        self.repository.bookings.get_by_id(id).await
    }

    /// Create a Confirmed booking, standalone or from an Accepted quotation.
    ///
    /// The total is priced from the equipment's current daily rates, not the
    /// rates frozen on the quotation. Every check runs before a code is
    /// reserved.
    pub async fn create(&self, data: &CreateBooking) -> AppResult<Booking> {
        let security_deposit = round_money(data.security_deposit.unwrap_or(Decimal::ZERO));
        ensure_amount("security_deposit", security_deposit)?;

        let source = match data.quotation_id {
            Some(id) => Some(self.accepted_quotation(id).await?),
            None => None,
        };

        let (customer_id, customer_name, customer_phone) = match (data.customer_id, &source) {
            (Some(id), _) => {
                let customer = self.repository.customers.get_by_id(id).await?;
                (
                    Some(customer.id),
                    customer.name,
                    Some(customer.phone).filter(|phone| !phone.is_empty()),
                )
            }
            (None, Some(quotation)) => (
                quotation.customer_id,
                quotation.customer_name.clone(),
                quotation.customer_phone.clone(),
            ),
            (None, None) => {
                return Err(AppError::Validation("A customer is required".to_string()));
            }
        };

        let start_date = data
            .start_date
            .or_else(|| source.as_ref().and_then(|q| q.start_date));
        let end_date = data
            .end_date
            .or_else(|| source.as_ref().and_then(|q| q.end_date));
        ensure_date_range(start_date, end_date)?;

        let (items, rates): (Vec<BookingItem>, Vec<Decimal>) = match (&data.items, &source) {
            (Some(lines), _) => {
                let equipment = load_line_equipment(&self.repository, lines).await?;
                lines
                    .iter()
                    .zip(equipment)
                    .map(|(line, equipment)| {
                        (
                            BookingItem {
                                equipment_id: equipment.id,
                                name: equipment.name,
                                quantity: line.quantity,
                            },
                            equipment.daily_rate,
                        )
                    })
                    .unzip()
            }
            (None, Some(quotation)) => self.quoted_lines(quotation).await?,
            (None, None) => {
                return Err(AppError::Validation(
                    "At least one equipment item is required".to_string(),
                ));
            }
        };
        let breakdown = price_lines(
            items
                .iter()
                .zip(&rates)
                .map(|(item, rate)| (*rate, item.quantity)),
        )?;

        let booking_id = self.identifiers.next(IdentifierKind::Booking).await?;
        let booking = self
            .repository
            .bookings
            .insert(&NewBooking {
                booking_id,
                source_quotation_id: source.as_ref().map(|q| q.id),
                customer_id,
                customer_name,
                customer_phone,
                start_date,
                end_date,
                items,
                total_amount: round_money(breakdown.total),
                security_deposit,
                status: BookingStatus::Confirmed,
            })
            .await?;

        if let Some(customer_id) = booking.customer_id {
            if let Err(e) = self
                .repository
                .customers
                .record_booking(customer_id, booking.created_at)
                .await
            {
                tracing::warn!(customer_id, error = %e, "Failed to update customer booking counters");
            }
        }

        tracing::info!(
            booking_id = %booking.booking_id,
            total = %booking.total_amount,
            from_quotation = ?booking.source_quotation_id,
            "Booking created"
        );
        Ok(booking)
    }

    /// Confirmed -> On Rent
    pub async fn start(&self, id: i32) -> AppResult<Booking> {
        self.transition(id, BookingStatus::OnRent).await
    }

    /// On Rent -> Completed. Only the status changes.
    pub async fn complete_return(&self, id: i32) -> AppResult<Booking> {
        self.transition(id, BookingStatus::Completed).await
    }

    /// Confirmed | On Rent -> Cancelled
    pub async fn cancel(&self, id: i32) -> AppResult<Booking> {
        self.transition(id, BookingStatus::Cancelled).await
    }

    /// Write `status` directly, bypassing the transition guards.
    /// Callers must restrict this to administrators.
    pub async fn override_status(&self, id: i32, status: BookingStatus) -> AppResult<Booking> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        if booking.status == status {
            return Ok(booking);
        }

        let updated = self
            .repository
            .bookings
            .set_status(id, booking.status, status)
            .await?
            .ok_or_else(|| concurrent_change(&booking))?;

        tracing::warn!(
            booking_id = %updated.booking_id,
            from = %booking.status,
            to = %status,
            "Booking status overridden"
        );
        self.sync_active_bookings(booking.status, &updated).await;
        Ok(updated)
    }

    async fn transition(&self, id: i32, next: BookingStatus) -> AppResult<Booking> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        if !booking.status.can_transition_to(next) {
            return Err(AppError::BusinessRule(format!(
                "Booking {} cannot move from {} to {}",
                booking.booking_id, booking.status, next
            )));
        }

        let updated = self
            .repository
            .bookings
            .set_status(id, booking.status, next)
            .await?
            .ok_or_else(|| concurrent_change(&booking))?;

        tracing::info!(
            booking_id = %updated.booking_id,
            from = %booking.status,
            to = %next,
            "Booking status changed"
        );
        self.sync_active_bookings(booking.status, &updated).await;
        Ok(updated)
    }

    /// Lines copied from a quotation keep the name they were quoted under and
    /// are priced at the current daily rate. Equipment deleted since quoting
    /// keeps its quoted rate.
    async fn quoted_lines(&self, quotation: &Quotation) -> AppResult<(Vec<BookingItem>, Vec<Decimal>)> {
        if quotation.items.is_empty() {
            return Err(AppError::Validation(
                "At least one equipment item is required".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(quotation.items.len());
        let mut rates = Vec::with_capacity(quotation.items.len());
        for item in &quotation.items {
            ensure_quantity(item.quantity)?;
            let rate = match self.repository.equipment.get_by_id(item.equipment_id).await {
                Ok(equipment) => equipment.daily_rate,
                Err(AppError::NotFound(_)) => {
                    tracing::warn!(
                        quotation_id = %quotation.quotation_id,
                        equipment_id = item.equipment_id,
                        "Quoted equipment no longer exists, keeping the quoted rate"
                    );
                    item.rate
                }
                Err(e) => return Err(e),
            };
            items.push(BookingItem {
                equipment_id: item.equipment_id,
                name: item.name.clone(),
                quantity: item.quantity,
            });
            rates.push(rate);
        }
        Ok((items, rates))
    }

    async fn accepted_quotation(&self, id: i32) -> AppResult<Quotation> {
        let quotation = self.repository.quotations.get_by_id(id).await?;
        if quotation.status != QuotationStatus::Accepted {
            return Err(AppError::BusinessRule(format!(
                "Quotation {} is {}, only accepted quotations can be booked",
                quotation.quotation_id, quotation.status
            )));
        }
        Ok(quotation)
    }

    /// Keep the customer's active count in step with terminal transitions.
    /// Counter drift is logged, never surfaced to the caller.
    async fn sync_active_bookings(&self, before: BookingStatus, booking: &Booking) {
        let delta = match (before.is_terminal(), booking.status.is_terminal()) {
            (false, true) => -1,
            (true, false) => 1,
            _ => return,
        };
        let Some(customer_id) = booking.customer_id else {
            return;
        };
        if let Err(e) = self
            .repository
            .customers
            .adjust_active_bookings(customer_id, delta)
            .await
        {
            tracing::warn!(customer_id, error = %e, "Failed to update customer active bookings");
        }
    }
}

fn concurrent_change(booking: &Booking) -> AppError {
    AppError::Conflict(format!(
        "Booking {} was modified concurrently",
        booking.booking_id
    ))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::customer::CreateCustomer;
    use crate::models::equipment::{CreateEquipment, UpdateEquipment};
    use crate::models::quotation::{CreateQuotation, LineItemRequest};
    use crate::repository::memory::MemoryStore;
    use crate::services::quotations::QuotationsService;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    struct Fixture {
        repository: Repository,
        bookings: BookingsService,
        quotations: QuotationsService,
        customer_id: i32,
        equipment_id: i32,
    }

    async fn fixture() -> Fixture {
        let repository = Repository::from_memory(Arc::new(MemoryStore::new()));
        let identifiers = IdentifierGenerator::new(repository.clone());
        let customer = repository
            .customers
            .create(&CreateCustomer {
                name: "Kamala Silva".to_string(),
                phone: "0712223344".to_string(),
                national_id: String::new(),
                address: String::new(),
                email: None,
            })
            .await
            .unwrap();
        let equipment = repository
            .equipment
            .create(&CreateEquipment {
                name: "Generator 5kVA".to_string(),
                category: "Power".to_string(),
                daily_rate: dec("3000"),
                weekly_rate: None,
                monthly_rate: None,
                status: None,
                description: None,
            })
            .await
            .unwrap();

        Fixture {
            bookings: BookingsService::new(repository.clone(), identifiers.clone()),
            quotations: QuotationsService::new(repository.clone(), identifiers),
            repository,
            customer_id: customer.id,
            equipment_id: equipment.id,
        }
    }

    fn standalone(f: &Fixture, quantity: i32) -> CreateBooking {
        CreateBooking {
            customer_id: Some(f.customer_id),
            items: Some(vec![LineItemRequest {
                equipment_id: f.equipment_id,
                quantity,
            }]),
            ..CreateBooking::default()
        }
    }

    #[tokio::test]
    async fn test_standalone_booking() {
        let f = fixture().await;
        let booking = f.bookings.create(&standalone(&f, 2)).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.total_amount, dec("6000"));
        assert_eq!(booking.security_deposit, Decimal::ZERO);
        assert_eq!(booking.customer_name, "Kamala Silva");
        assert!(booking.booking_id.starts_with("BK-"));

        let customer = f.repository.customers.get_by_id(f.customer_id).await.unwrap();
        assert_eq!(customer.total_bookings, 1);
        assert_eq!(customer.active_bookings, 1);
        assert!(customer.last_booking.is_some());
    }

    #[tokio::test]
    async fn test_rental_lifecycle() {
        let f = fixture().await;
        let booking = f.bookings.create(&standalone(&f, 1)).await.unwrap();

        assert!(matches!(
            f.bookings.complete_return(booking.id).await,
            Err(AppError::BusinessRule(_))
        ));
        let on_rent = f.bookings.start(booking.id).await.unwrap();
        assert_eq!(on_rent.status, BookingStatus::OnRent);
        let completed = f.bookings.complete_return(booking.id).await.unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        assert!(matches!(
            f.bookings.cancel(booking.id).await,
            Err(AppError::BusinessRule(_))
        ));

        let customer = f.repository.customers.get_by_id(f.customer_id).await.unwrap();
        assert_eq!(customer.total_bookings, 1);
        assert_eq!(customer.active_bookings, 0);
    }

    #[tokio::test]
    async fn test_override_skips_guards() {
        let f = fixture().await;
        let booking = f.bookings.create(&standalone(&f, 1)).await.unwrap();

        let completed = f
            .bookings
            .override_status(booking.id, BookingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        let customer = f.repository.customers.get_by_id(f.customer_id).await.unwrap();
        assert_eq!(customer.active_bookings, 0);

        // Reopening a finished booking counts it as active again
        let reopened = f
            .bookings
            .override_status(booking.id, BookingStatus::OnRent)
            .await
            .unwrap();
        assert_eq!(reopened.status, BookingStatus::OnRent);
        let customer = f.repository.customers.get_by_id(f.customer_id).await.unwrap();
        assert_eq!(customer.active_bookings, 1);
    }

    #[tokio::test]
    async fn test_deposit_rules() {
        let f = fixture().await;
        let mut request = standalone(&f, 1);
        request.security_deposit = Some(dec("-500"));
        assert!(matches!(
            f.bookings.create(&request).await,
            Err(AppError::Validation(_))
        ));

        request.security_deposit = Some(dec("15000"));
        let booking = f.bookings.create(&request).await.unwrap();
        assert_eq!(booking.security_deposit, dec("15000"));
    }

    #[tokio::test]
    async fn test_customer_and_items_required() {
        let f = fixture().await;
        let no_customer = CreateBooking {
            items: Some(vec![LineItemRequest {
                equipment_id: f.equipment_id,
                quantity: 1,
            }]),
            ..CreateBooking::default()
        };
        assert!(matches!(
            f.bookings.create(&no_customer).await,
            Err(AppError::Validation(_))
        ));

        let no_items = CreateBooking {
            customer_id: Some(f.customer_id),
            ..CreateBooking::default()
        };
        assert!(matches!(
            f.bookings.create(&no_items).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_booking_from_accepted_quotation() {
        let f = fixture().await;
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let quotation = f
            .quotations
            .create(&CreateQuotation {
                customer_id: f.customer_id,
                start_date: Some(start),
                end_date: Some(end),
                items: vec![LineItemRequest {
                    equipment_id: f.equipment_id,
                    quantity: 3,
                }],
            })
            .await
            .unwrap();

        let from_quotation = CreateBooking {
            quotation_id: Some(quotation.id),
            ..CreateBooking::default()
        };
        assert!(matches!(
            f.bookings.create(&from_quotation).await,
            Err(AppError::BusinessRule(_))
        ));

        f.quotations.accept(quotation.id).await.unwrap();

        // Rates move after quoting; the booking is priced at today's rate
        f.repository
            .equipment
            .update(
                f.equipment_id,
                &UpdateEquipment {
                    daily_rate: Some(dec("3500")),
                    name: Some("Generator 5kVA (new)".to_string()),
                    ..UpdateEquipment::default()
                },
            )
            .await
            .unwrap();

        let booking = f.bookings.create(&from_quotation).await.unwrap();
        assert_eq!(booking.source_quotation_id, Some(quotation.id));
        assert_eq!(booking.customer_name, quotation.customer_name);
        assert_eq!(booking.customer_id, Some(f.customer_id));
        assert_eq!(booking.start_date, Some(start));
        assert_eq!(booking.end_date, Some(end));
        assert_eq!(booking.items.len(), 1);
        assert_eq!(booking.items[0].name, quotation.items[0].name);
        assert_eq!(booking.items[0].quantity, 3);
        assert_eq!(quotation.total_amount, dec("9000"));
        assert_eq!(booking.total_amount, dec("10500"));
    }

    #[tokio::test]
    async fn test_booking_keeps_lines_for_deleted_equipment() {
        let f = fixture().await;
        let compactor = f
            .repository
            .equipment
            .create(&CreateEquipment {
                name: "Plate Compactor".to_string(),
                category: "Compaction".to_string(),
                daily_rate: dec("1200"),
                weekly_rate: None,
                monthly_rate: None,
                status: None,
                description: None,
            })
            .await
            .unwrap();
        let quotation = f
            .quotations
            .create(&CreateQuotation {
                customer_id: f.customer_id,
                start_date: None,
                end_date: None,
                items: vec![
                    LineItemRequest {
                        equipment_id: f.equipment_id,
                        quantity: 1,
                    },
                    LineItemRequest {
                        equipment_id: compactor.id,
                        quantity: 2,
                    },
                ],
            })
            .await
            .unwrap();
        f.quotations.accept(quotation.id).await.unwrap();
        f.repository.equipment.delete(compactor.id).await.unwrap();

        let booking = f
            .bookings
            .create(&CreateBooking {
                quotation_id: Some(quotation.id),
                ..CreateBooking::default()
            })
            .await
            .unwrap();

        assert_eq!(booking.items.len(), 2);
        assert_eq!(booking.items[1].equipment_id, compactor.id);
        assert_eq!(booking.items[1].name, "Plate Compactor");
        assert_eq!(booking.items[1].quantity, 2);
        assert_eq!(booking.total_amount, dec("5400"));
    }

    #[tokio::test]
    async fn test_oversized_deposit_rejected() {
        let f = fixture().await;
        let mut request = standalone(&f, 1);
        request.security_deposit = Some(dec("1000000000000"));
        assert!(matches!(
            f.bookings.create(&request).await,
            Err(AppError::Validation(_))
        ));
        assert!(f.bookings.list().await.unwrap().is_empty());
    }
}
