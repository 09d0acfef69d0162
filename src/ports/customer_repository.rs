use async_trait::async_trait;

use super::store::Result;
use crate::domain::{Customer, CustomerId};

#[async_trait]
pub trait CustomerRepository: Send {
    async fn find_by_id(&mut self, customer_id: CustomerId) -> Result<Option<Customer>>;

    async fn find_by_email(&mut self, email: &str) -> Result<Option<Customer>>;

    async fn save(&mut self, customer: &Customer) -> Result<()>;

    async fn delete(&mut self, customer_id: CustomerId) -> Result<()>;
}
