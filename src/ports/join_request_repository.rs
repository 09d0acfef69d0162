use async_trait::async_trait;

use super::store::Result;
use crate::domain::{BarberId, BarbershopId, JoinRequest, JoinRequestId};

#[async_trait]
pub trait JoinRequestRepository: Send {
    async fn find_by_id(&mut self, join_request_id: JoinRequestId) -> Result<Option<JoinRequest>>;

    /// The pending request of a barber for one barbershop, if any.
    async fn find_pending(
        &mut self,
        barber_id: BarberId,
        barbershop_id: BarbershopId,
    ) -> Result<Option<JoinRequest>>;

    /// Oldest first.
    async fn list_pending_for_barbershop(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<Vec<JoinRequest>>;

    /// Oldest first.
    async fn list_for_barber(&mut self, barber_id: BarberId) -> Result<Vec<JoinRequest>>;

    /// Insert or replace.
    ///
    /// A second pending request for the same barber and barbershop fails
    /// with `DuplicateKeyError::PendingJoinRequest`.
    async fn save(&mut self, request: &JoinRequest) -> Result<()>;

    async fn delete(&mut self, join_request_id: JoinRequestId) -> Result<()>;

    async fn delete_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<()>;

    async fn delete_by_barber(&mut self, barber_id: BarberId) -> Result<()>;
}
