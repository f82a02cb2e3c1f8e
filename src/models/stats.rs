//! Dashboard statistics

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::{
    booking::{Booking, BookingStatus},
    equipment::{Equipment, EquipmentStatus},
    quotation::{Quotation, QuotationStatus},
};
use crate::pricing::round_money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EquipmentStats {
    pub total: i64,
    pub available: i64,
    pub on_rent: i64,
    pub under_maintenance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuotationStats {
    pub total: i64,
    /// Draft or Sent
    pub pending: i64,
    pub accepted: i64,
    pub declined: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookingStats {
    pub total: i64,
    pub confirmed: i64,
    pub on_rent: i64,
    pub completed: i64,
    pub cancelled: i64,
    /// Sum of totals of completed bookings
    pub completed_revenue: Decimal,
    /// Deposits held on bookings not yet completed or cancelled
    pub deposits_held: Decimal,
}

/// Dashboard summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub equipment: EquipmentStats,
    pub customers: i64,
    pub quotations: QuotationStats,
    pub bookings: BookingStats,
}

impl DashboardStats {
    pub fn compute(
        equipment: &[Equipment],
        customers: i64,
        quotations: &[Quotation],
        bookings: &[Booking],
    ) -> Self {
        let count_equipment =
            |status: EquipmentStatus| equipment.iter().filter(|e| e.status == status).count() as i64;
        let count_quotations = |pred: &dyn Fn(QuotationStatus) -> bool| {
            quotations.iter().filter(|q| pred(q.status)).count() as i64
        };
        let count_bookings =
            |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count() as i64;

        let completed_revenue = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Completed)
            .map(|b| b.total_amount)
            .sum::<Decimal>();
        let deposits_held = bookings
            .iter()
            .filter(|b| !b.status.is_terminal())
            .map(|b| b.security_deposit)
            .sum::<Decimal>();

        DashboardStats {
            equipment: EquipmentStats {
                total: equipment.len() as i64,
                available: count_equipment(EquipmentStatus::Available),
                on_rent: count_equipment(EquipmentStatus::OnRent),
                under_maintenance: count_equipment(EquipmentStatus::UnderMaintenance),
            },
            customers,
            quotations: QuotationStats {
                total: quotations.len() as i64,
                pending: count_quotations(&|s| {
                    matches!(s, QuotationStatus::Draft | QuotationStatus::Sent)
                }),
                accepted: count_quotations(&|s| s == QuotationStatus::Accepted),
                declined: count_quotations(&|s| s == QuotationStatus::Declined),
            },
            bookings: BookingStats {
                total: bookings.len() as i64,
                confirmed: count_bookings(BookingStatus::Confirmed),
                on_rent: count_bookings(BookingStatus::OnRent),
                completed: count_bookings(BookingStatus::Completed),
                cancelled: count_bookings(BookingStatus::Cancelled),
                completed_revenue: round_money(completed_revenue),
                deposits_held: round_money(deposits_held),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;

    use super::*;

    fn equipment(id: i32, status: EquipmentStatus) -> Equipment {
        Equipment {
            id,
            name: format!("Item {}", id),
            category: String::new(),
            daily_rate: Decimal::ONE_HUNDRED,
            weekly_rate: Decimal::ZERO,
            monthly_rate: Decimal::ZERO,
            status,
            description: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn quotation(id: i32, status: QuotationStatus) -> Quotation {
        Quotation {
            id,
            quotation_id: format!("QT-2025-{:03}", id),
            customer_id: None,
            customer_name: "Walk-in".to_string(),
            customer_phone: None,
            start_date: None,
            end_date: None,
            items: Vec::new(),
            total_amount: Decimal::ZERO,
            status,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn booking(id: i32, status: BookingStatus, total: &str, deposit: &str) -> Booking {
        Booking {
            id,
            booking_id: format!("BK-2025-{:03}", id),
            source_quotation_id: None,
            customer_id: None,
            customer_name: "Walk-in".to_string(),
            customer_phone: None,
            start_date: None,
            end_date: None,
            items: Vec::new(),
            total_amount: Decimal::from_str(total).unwrap(),
            security_deposit: Decimal::from_str(deposit).unwrap(),
            status,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_compute() {
        let equipment = [
            equipment(1, EquipmentStatus::Available),
            equipment(2, EquipmentStatus::Available),
            equipment(3, EquipmentStatus::OnRent),
            equipment(4, EquipmentStatus::UnderMaintenance),
        ];
        let quotations = [
            quotation(1, QuotationStatus::Draft),
            quotation(2, QuotationStatus::Sent),
            quotation(3, QuotationStatus::Accepted),
            quotation(4, QuotationStatus::Declined),
        ];
        let bookings = [
            booking(1, BookingStatus::Confirmed, "1000.00", "500.00"),
            booking(2, BookingStatus::OnRent, "2000.00", "250.50"),
            booking(3, BookingStatus::Completed, "3000.25", "1000.00"),
            booking(4, BookingStatus::Completed, "1500.25", "0"),
            booking(5, BookingStatus::Cancelled, "9999.00", "700.00"),
        ];

        let stats = DashboardStats::compute(&equipment, 7, &quotations, &bookings);

        assert_eq!(stats.equipment.total, 4);
        assert_eq!(stats.equipment.available, 2);
        assert_eq!(stats.equipment.on_rent, 1);
        assert_eq!(stats.equipment.under_maintenance, 1);
        assert_eq!(stats.customers, 7);
        assert_eq!(stats.quotations.pending, 2);
        assert_eq!(stats.quotations.accepted, 1);
        assert_eq!(stats.quotations.declined, 1);
        assert_eq!(stats.bookings.total, 5);
        assert_eq!(stats.bookings.completed, 2);
        assert_eq!(stats.bookings.cancelled, 1);
        assert_eq!(stats.bookings.completed_revenue, Decimal::from_str("4500.50").unwrap());
        assert_eq!(stats.bookings.deposits_held, Decimal::from_str("750.50").unwrap());
    }

    #[test]
    fn test_compute_empty() {
        let stats = DashboardStats::compute(&[], 0, &[], &[]);
        assert_eq!(stats.bookings.completed_revenue, Decimal::ZERO);
        assert_eq!(stats.quotations.total, 0);
    }
}
