//! Customer registry service

use validator::Validate;

use crate::{
    error::AppResult,
    models::customer::{CreateCustomer, Customer, UpdateCustomer},
    repository::Repository,
};

#[derive(Clone)]
pub struct CustomersService {
    repository: Repository,
}

impl CustomersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Customer>> {
        self.repository.customers.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Customer> {
        self.repository.customers.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateCustomer) -> AppResult<Customer> {
        data.validate()?;
        let customer = self.repository.customers.create(data).await?;
        tracing::info!(id = customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn update(&self, id: i32, data: &UpdateCustomer) -> AppResult<Customer> {
        data.validate()?;
        self.repository.customers.update(id, data).await
    }

    /// Bookings and quotations keep their denormalised customer name
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.customers.delete(id).await?;
        tracing::info!(id, "Customer deleted");
        Ok(())
    }
}
