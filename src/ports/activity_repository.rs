use async_trait::async_trait;

use super::store::Result;
use crate::domain::{Activity, ActivityId, BarbershopId};

#[async_trait]
pub trait ActivityRepository: Send {
    async fn find_by_id(&mut self, activity_id: ActivityId) -> Result<Option<Activity>>;

    /// The activities among `activity_ids` that exist. Missing ids are
    /// silently skipped; callers compare lengths.
    async fn find_by_ids(&mut self, activity_ids: &[ActivityId]) -> Result<Vec<Activity>>;

    /// Activities of a barbershop, ordered by name.
    async fn list_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<Vec<Activity>>;

    async fn save(&mut self, activity: &Activity) -> Result<()>;

    async fn delete(&mut self, activity_id: ActivityId) -> Result<()>;

    async fn delete_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<()>;
}
