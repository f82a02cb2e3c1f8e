//! In-process store implementing every repository trait.
//!
//! All state sits behind one async mutex, so each trait call is atomic with
//! respect to every other call. Used for `memory://` URLs and in tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{
    BookingRepository, CustomerRepository, EquipmentRepository, QuotationRepository,
    SequenceRepository, SettingsRepository, UserRepository,
};
use crate::{
    error::{AppError, AppResult},
    identifiers::IdentifierKind,
    models::{
        booking::{Booking, BookingStatus, NewBooking},
        customer::{CreateCustomer, Customer, UpdateCustomer},
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        quotation::{NewQuotation, Quotation, QuotationStatus},
        settings::{Settings, UpdateSettings},
        user::{Role, User},
    },
    pricing::round_money,
};

#[derive(Default)]
struct State {
    last_id: i32,
    equipment: BTreeMap<i32, Equipment>,
    customers: BTreeMap<i32, Customer>,
    quotations: BTreeMap<i32, Quotation>,
    bookings: BTreeMap<i32, Booking>,
    sequences: HashMap<(IdentifierKind, i32), i64>,
    settings: Option<Settings>,
    users: BTreeMap<i32, User>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the last issued sequence value for `(kind, year)`
    pub async fn seed_sequence(&self, kind: IdentifierKind, year: i32, last_value: i64) {
        self.state.lock().await.sequences.insert((kind, year), last_value);
    }
}

fn not_found(entity: &str, id: i32) -> AppError {
    AppError::NotFound(format!("{} {} not found", entity, id))
}

/// Newest first, matching the Postgres ordering
fn newest_first<T: Clone>(
    rows: &BTreeMap<i32, T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut list: Vec<(i32, T)> = rows.iter().map(|(id, row)| (*id, row.clone())).collect();
    list.sort_by(|(a_id, a), (b_id, b)| {
        created_at(b)
            .cmp(&created_at(a))
            .then_with(|| b_id.cmp(a_id))
    });
    list.into_iter().map(|(_, row)| row).collect()
}

#[async_trait]
impl EquipmentRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let state = self.state.lock().await;
        let mut list: Vec<Equipment> = state.equipment.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        let state = self.state.lock().await;
        state
            .equipment
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Equipment", id))
    }

    async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let equipment = Equipment {
            id,
            name: data.name.clone(),
            category: data.category.clone(),
            daily_rate: round_money(data.daily_rate),
            weekly_rate: round_money(data.weekly_rate.unwrap_or_default()),
            monthly_rate: round_money(data.monthly_rate.unwrap_or_default()),
            status: data.status.unwrap_or_default(),
            description: data.description.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        state.equipment.insert(id, equipment.clone());
        Ok(equipment)
    }

    async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let mut state = self.state.lock().await;
        let equipment = state
            .equipment
            .get_mut(&id)
            .ok_or_else(|| not_found("Equipment", id))?;

        if let Some(ref name) = data.name {
            equipment.name = name.clone();
        }
        if let Some(ref category) = data.category {
            equipment.category = category.clone();
        }
        if let Some(rate) = data.daily_rate {
            equipment.daily_rate = round_money(rate);
        }
        if let Some(rate) = data.weekly_rate {
            equipment.weekly_rate = round_money(rate);
        }
        if let Some(rate) = data.monthly_rate {
            equipment.monthly_rate = round_money(rate);
        }
        if let Some(status) = data.status {
            equipment.status = status;
        }
        if let Some(ref description) = data.description {
            equipment.description = Some(description.clone());
        }
        equipment.updated_at = Some(Utc::now());
        Ok(equipment.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .equipment
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Equipment", id))
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Customer>> {
        let state = self.state.lock().await;
        let mut list: Vec<Customer> = state.customers.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Customer> {
        let state = self.state.lock().await;
        state
            .customers
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Customer", id))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().await.customers.len() as i64)
    }

    async fn create(&self, data: &CreateCustomer) -> AppResult<Customer> {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let customer = Customer {
            id,
            name: data.name.clone(),
            phone: data.phone.clone(),
            national_id: data.national_id.clone(),
            address: data.address.clone(),
            email: data.email.clone(),
            total_bookings: 0,
            active_bookings: 0,
            last_booking: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn update(&self, id: i32, data: &UpdateCustomer) -> AppResult<Customer> {
        let mut state = self.state.lock().await;
        let customer = state
            .customers
            .get_mut(&id)
            .ok_or_else(|| not_found("Customer", id))?;

        if let Some(ref name) = data.name {
            customer.name = name.clone();
        }
        if let Some(ref phone) = data.phone {
            customer.phone = phone.clone();
        }
        if let Some(ref national_id) = data.national_id {
            customer.national_id = national_id.clone();
        }
        if let Some(ref address) = data.address {
            customer.address = address.clone();
        }
        if let Some(ref email) = data.email {
            customer.email = Some(email.clone());
        }
        customer.updated_at = Some(Utc::now());
        Ok(customer.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .customers
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Customer", id))
    }

    async fn record_booking(&self, id: i32, at: DateTime<Utc>) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let customer = state
            .customers
            .get_mut(&id)
            .ok_or_else(|| not_found("Customer", id))?;
        customer.total_bookings += 1;
        customer.active_bookings += 1;
        customer.last_booking = Some(at);
        Ok(())
    }

    async fn adjust_active_bookings(&self, id: i32, delta: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let customer = state
            .customers
            .get_mut(&id)
            .ok_or_else(|| not_found("Customer", id))?;
        customer.active_bookings = (customer.active_bookings + delta).max(0);
        Ok(())
    }
}

#[async_trait]
impl QuotationRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Quotation>> {
        let state = self.state.lock().await;
        Ok(newest_first(&state.quotations, |q| q.created_at))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Quotation> {
        let state = self.state.lock().await;
        state
            .quotations
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Quotation", id))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().await.quotations.len() as i64)
    }

    async fn insert(&self, quotation: &NewQuotation) -> AppResult<Quotation> {
        let mut state = self.state.lock().await;
        if state
            .quotations
            .values()
            .any(|q| q.quotation_id == quotation.quotation_id)
        {
            return Err(AppError::Conflict("Quotation id already exists".to_string()));
        }
        let id = state.next_id();
        let stored = Quotation {
            id,
            quotation_id: quotation.quotation_id.clone(),
            customer_id: quotation.customer_id,
            customer_name: quotation.customer_name.clone(),
            customer_phone: quotation.customer_phone.clone(),
            start_date: quotation.start_date,
            end_date: quotation.end_date,
            items: quotation.items.clone(),
            total_amount: quotation.total_amount,
            status: quotation.status,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.quotations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn set_status(
        &self,
        id: i32,
        current: QuotationStatus,
        next: QuotationStatus,
    ) -> AppResult<Option<Quotation>> {
        let mut state = self.state.lock().await;
        match state.quotations.get_mut(&id) {
            Some(quotation) if quotation.status == current => {
                quotation.status = next;
                quotation.updated_at = Some(Utc::now());
                Ok(Some(quotation.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Booking>> {
        let state = self.state.lock().await;
        Ok(newest_first(&state.bookings, |b| b.created_at))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Booking> {
        let state = self.state.lock().await;
        state
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Booking", id))
    }

    async fn insert(&self, booking: &NewBooking) -> AppResult<Booking> {
        let mut state = self.state.lock().await;
        if state
            .bookings
            .values()
            .any(|b| b.booking_id == booking.booking_id)
        {
            return Err(AppError::Conflict("Booking id already exists".to_string()));
        }
        let id = state.next_id();
        let stored = Booking {
            id,
            booking_id: booking.booking_id.clone(),
            source_quotation_id: booking.source_quotation_id,
            customer_id: booking.customer_id,
            customer_name: booking.customer_name.clone(),
            customer_phone: booking.customer_phone.clone(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            items: booking.items.clone(),
            total_amount: booking.total_amount,
            security_deposit: booking.security_deposit,
            status: booking.status,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.bookings.insert(id, stored.clone());
        Ok(stored)
    }

    async fn set_status(
        &self,
        id: i32,
        current: BookingStatus,
        next: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let mut state = self.state.lock().await;
        match state.bookings.get_mut(&id) {
            Some(booking) if booking.status == current => {
                booking.status = next;
                booking.updated_at = Some(Utc::now());
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl SequenceRepository for MemoryStore {
    async fn next_value(&self, kind: IdentifierKind, year: i32) -> AppResult<i64> {
        let mut state = self.state.lock().await;
        let value = state.sequences.entry((kind, year)).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn get_or_create(&self) -> AppResult<Settings> {
        let mut state = self.state.lock().await;
        Ok(state.settings.get_or_insert_with(Settings::default).clone())
    }

    async fn update(&self, patch: &UpdateSettings) -> AppResult<Settings> {
        let mut state = self.state.lock().await;
        let settings = state.settings.get_or_insert_with(Settings::default);
        settings.apply(patch);
        settings.updated_at = Some(Utc::now());
        Ok(settings.clone())
    }

    async fn set_logo_path(&self, path: &str) -> AppResult<Settings> {
        let mut state = self.state.lock().await;
        let settings = state.settings.get_or_insert_with(Settings::default);
        settings.logo_path = Some(path.to_string());
        settings.updated_at = Some(Utc::now());
        Ok(settings.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_by_id(&self, id: i32) -> AppResult<User> {
        let state = self.state.lock().await;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("User", id))
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().await.users.len() as i64)
    }

    async fn create(&self, username: &str, password_hash: &str, role: Role) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        let id = state.next_id();
        let user = User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now(),
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state.users.get_mut(&id).ok_or_else(|| not_found("User", id))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}
