//! Data models for RentFlow

pub mod booking;
pub mod customer;
pub mod equipment;
pub mod quotation;
pub mod settings;
pub mod stats;
pub mod user;

// Re-export commonly used types
pub use booking::{Booking, BookingItem, BookingStatus};
pub use customer::Customer;
pub use equipment::{Equipment, EquipmentStatus};
pub use quotation::{LineItemRequest, Quotation, QuotationItem, QuotationStatus};
pub use settings::Settings;
pub use user::{Role, User, UserClaims};
