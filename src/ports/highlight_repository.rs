use async_trait::async_trait;

use super::store::Result;
use crate::domain::{BarbershopId, Highlight, HighlightId};

#[async_trait]
pub trait HighlightRepository: Send {
    async fn find_by_id(&mut self, highlight_id: HighlightId) -> Result<Option<Highlight>>;

    /// Oldest first.
    async fn list_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<Vec<Highlight>>;

    async fn save(&mut self, highlight: &Highlight) -> Result<()>;

    async fn delete(&mut self, highlight_id: HighlightId) -> Result<()>;

    async fn delete_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<()>;
}
