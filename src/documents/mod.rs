//! Printable documents: quotations and rental agreements.
//!
//! A [`DocumentSnapshot`] is a finalised, self-contained copy of everything a
//! document shows. Renderers turn snapshots into bytes and never touch the
//! store.

pub mod pdf;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::AppResult,
    models::{booking::Booking, customer::Customer, quotation::Quotation, settings::Settings},
};

pub use pdf::PdfRenderer;

/// Characters per printed line
const LINE_WIDTH: usize = 80;

/// Turns a snapshot into a downloadable file
pub trait DocumentRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    fn render(&self, document: &DocumentSnapshot) -> AppResult<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Quotation,
    RentalAgreement,
}

/// Business letterhead taken from settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Letterhead {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// The customer a document is addressed to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Party {
    pub name: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLine {
    pub description: String,
    pub quantity: i32,
    /// Quotations show frozen rates; agreements list equipment only
    pub rate: Option<Decimal>,
    pub subtotal: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub kind: DocumentKind,
    /// `QT-..` or `BK-..` code, also used as the file name
    pub code: String,
    pub issued_on: NaiveDate,
    pub letterhead: Letterhead,
    pub party: Party,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub lines: Vec<DocumentLine>,
    pub currency: String,
    pub total: Decimal,
    pub security_deposit: Option<Decimal>,
    pub validity_days: Option<i32>,
}

impl Letterhead {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            name: settings
                .company_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Equipment Rentals".to_string()),
            address: settings.company_address.clone(),
            phone: settings.company_phone.clone(),
            email: settings.company_email.clone(),
        }
    }
}

impl DocumentSnapshot {
    pub fn from_quotation(quotation: &Quotation, settings: &Settings, issued_on: NaiveDate) -> Self {
        Self {
            kind: DocumentKind::Quotation,
            code: quotation.quotation_id.clone(),
            issued_on,
            letterhead: Letterhead::from_settings(settings),
            party: Party {
                name: quotation.customer_name.clone(),
                phone: quotation.customer_phone.clone(),
                national_id: None,
                address: None,
            },
            status: quotation.status.to_string(),
            start_date: quotation.start_date,
            end_date: quotation.end_date,
            lines: quotation
                .items
                .iter()
                .map(|item| DocumentLine {
                    description: item.name.clone(),
                    quantity: item.quantity,
                    rate: Some(item.rate),
                    subtotal: Some(item.subtotal),
                })
                .collect(),
            currency: settings.default_currency.clone(),
            total: quotation.total_amount,
            security_deposit: None,
            validity_days: Some(settings.quotation_validity_days),
        }
    }

    /// Rental agreement for a booking. Hirer identity details come from the
    /// customer record when it still exists.
    pub fn from_booking(
        booking: &Booking,
        customer: Option<&Customer>,
        settings: &Settings,
        issued_on: NaiveDate,
    ) -> Self {
        let non_empty = |value: &str| Some(value.to_string()).filter(|v| !v.is_empty());
        Self {
            kind: DocumentKind::RentalAgreement,
            code: booking.booking_id.clone(),
            issued_on,
            letterhead: Letterhead::from_settings(settings),
            party: Party {
                name: booking.customer_name.clone(),
                phone: booking
                    .customer_phone
                    .clone()
                    .or_else(|| customer.and_then(|c| non_empty(&c.phone))),
                national_id: customer.and_then(|c| non_empty(&c.national_id)),
                address: customer.and_then(|c| non_empty(&c.address)),
            },
            status: booking.status.to_string(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            lines: booking
                .items
                .iter()
                .map(|item| DocumentLine {
                    description: item.name.clone(),
                    quantity: item.quantity,
                    rate: None,
                    subtotal: None,
                })
                .collect(),
            currency: settings.default_currency.clone(),
            total: booking.total_amount,
            security_deposit: Some(booking.security_deposit),
            validity_days: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            DocumentKind::Quotation => "QUOTATION",
            DocumentKind::RentalAgreement => "EQUIPMENT RENTAL AGREEMENT",
        }
    }

    /// Plain-text layout shared by all renderers
    pub fn text_lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        let head = &self.letterhead;

        out.push(head.name.clone());
        let contact: Vec<&str> = [head.address.as_deref(), head.phone.as_deref(), head.email.as_deref()]
            .into_iter()
            .flatten()
            .filter(|value| !value.is_empty())
            .collect();
        if !contact.is_empty() {
            out.extend(wrap(&contact.join(" | "), LINE_WIDTH));
        }
        out.push(String::new());
        out.push(self.title().to_string());
        out.push("=".repeat(self.title().len()));

        let number_label = match self.kind {
            DocumentKind::Quotation => "Quotation No",
            DocumentKind::RentalAgreement => "Agreement No",
        };
        out.push(format!("{}: {}", number_label, self.code));
        out.push(format!("Date: {}", self.issued_on));
        out.push(format!("Status: {}", self.status));
        out.push(String::new());

        let party_label = match self.kind {
            DocumentKind::Quotation => "Customer",
            DocumentKind::RentalAgreement => "Hirer",
        };
        out.push(format!("{}: {}", party_label, self.party.name));
        if let Some(ref national_id) = self.party.national_id {
            out.push(format!("National ID: {}", national_id));
        }
        if let Some(ref address) = self.party.address {
            out.extend(wrap(&format!("Address: {}", address), LINE_WIDTH));
        }
        if let Some(ref phone) = self.party.phone {
            out.push(format!("Contact: {}", phone));
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            let show = |date: Option<NaiveDate>| date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
            out.push(format!(
                "Rental period: {} to {}",
                show(self.start_date),
                show(self.end_date)
            ));
        }
        out.push(String::new());

        match self.kind {
            DocumentKind::Quotation => {
                out.push(format!("{:<38}{:>6}{:>16}{:>18}", "Item", "Qty", "Rate", "Subtotal"));
                out.push("-".repeat(78));
                for line in &self.lines {
                    out.push(format!(
                        "{:<38}{:>6}{:>16}{:>18}",
                        truncate(&line.description, 37),
                        line.quantity,
                        money(line.rate),
                        money(line.subtotal)
                    ));
                }
                out.push("-".repeat(78));
                out.push(format!("Total: {} {:.2}", self.currency, self.total));
                if let Some(days) = self.validity_days {
                    out.push(format!("This quotation is valid for {} days.", days));
                }
            }
            DocumentKind::RentalAgreement => {
                out.push("RENTED EQUIPMENT".to_string());
                out.push(format!("{:<60}{:>10}", "Item Description", "Quantity"));
                out.push("-".repeat(70));
                for line in &self.lines {
                    out.push(format!(
                        "{:<60}{:>10}",
                        truncate(&line.description, 59),
                        line.quantity
                    ));
                }
                out.push(String::new());

                let deposit = self.security_deposit.unwrap_or_default();
                out.push("FINANCIALS".to_string());
                out.push(format!("{:<40}{:>20.2}", "Total Rental Fee", self.total));
                out.push(format!("{:<40}{:>20.2}", "Refundable Security Deposit", deposit));
                out.push(format!(
                    "{:<40}{:>20.2}",
                    format!("Total Amount Payable ({})", self.currency),
                    self.total + deposit
                ));
                out.push(String::new());

                out.push("TERMS AND CONDITIONS".to_string());
                for (i, term) in RENTAL_TERMS.iter().enumerate() {
                    out.extend(wrap(&format!("{}. {}", i + 1, term), LINE_WIDTH));
                }
                out.push(String::new());
                out.push("Signature of Hirer: ______________________".to_string());
                out.push(String::new());
                out.push(format!("For {}: ______________________", head.name));
            }
        }

        out
    }
}

const RENTAL_TERMS: &[&str] = &[
    "The Hirer confirms the equipment listed above was received clean and in working order.",
    "The security deposit covers damage, loss or late return and is refunded when the equipment comes back in its original condition, fair wear excepted.",
    "The equipment is used safely, for its intended purpose only.",
    "The Hirer is responsible for damage, loss or theft during the rental period. Costs beyond the deposit are payable by the Hirer.",
    "Equipment is returned clean on the agreed end date. Fuel-powered machines are returned with a full tank.",
    "Each day of late return is charged at the standard daily rate.",
    "The Hirer assumes all liability for injury or damage arising from use or transport of the equipment.",
];

fn money(value: Option<Decimal>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

/// Greedy word wrap; words longer than `width` are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
