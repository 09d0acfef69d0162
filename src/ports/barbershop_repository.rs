use async_trait::async_trait;

use super::store::Result;
use crate::domain::{Barbershop, BarbershopId};

#[async_trait]
pub trait BarbershopRepository: Send {
    async fn find_by_id(&mut self, barbershop_id: BarbershopId) -> Result<Option<Barbershop>>;

    /// `find_by_id`, holding the barbershop row until the transaction ends.
    /// Closing a shop takes the same row, so writers that need the shop to
    /// stay open wait for it.
    async fn find_by_id_for_update(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<Option<Barbershop>>;

    /// Registration numbers are unique across barbershops.
    async fn find_by_registration_number(
        &mut self,
        registration_number: &str,
    ) -> Result<Option<Barbershop>>;

    /// All barbershops ordered by name.
    async fn list(&mut self) -> Result<Vec<Barbershop>>;

    /// Insert or replace.
    ///
    /// A repeated registration number fails with
    /// `DuplicateKeyError::RegistrationNumber`.
    async fn save(&mut self, barbershop: &Barbershop) -> Result<()>;

    async fn delete(&mut self, barbershop_id: BarbershopId) -> Result<()>;
}
