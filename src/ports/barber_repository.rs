use async_trait::async_trait;

use super::store::Result;
use crate::domain::{Barber, BarberId, BarbershopId};

/// Barber persistence, including the assigned activity set.
#[async_trait]
pub trait BarberRepository: Send {
    async fn find_by_id(&mut self, barber_id: BarberId) -> Result<Option<Barber>>;

    /// Email is the principal identifier of an authenticated barber.
    async fn find_by_email(&mut self, email: &str) -> Result<Option<Barber>>;

    /// `find_by_id`, holding the barber row until the transaction ends.
    ///
    /// Every read-modify-write of a barber starts here, so concurrent
    /// updates apply one after the other instead of overwriting each other.
    async fn find_by_id_for_update(&mut self, barber_id: BarberId) -> Result<Option<Barber>>;

    /// `find_by_email`, holding the barber row until the transaction ends.
    async fn find_by_email_for_update(&mut self, email: &str) -> Result<Option<Barber>>;

    /// Staff and owner of a barbershop, ordered by name.
    async fn list_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<Vec<Barber>>;

    /// Insert or replace, activity set included.
    async fn save(&mut self, barber: &Barber) -> Result<()>;

    async fn delete(&mut self, barber_id: BarberId) -> Result<()>;
}
