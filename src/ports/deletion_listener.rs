use async_trait::async_trait;

use super::store::{Result, StoreTx};
use crate::domain::{BeforeDelete, DeletionVeto};

/// Hook run inside the deleting transaction before an account disappears.
///
/// Returning a veto aborts the deletion; nothing is written.
#[async_trait]
pub trait DeletionListener: Send + Sync {
    async fn before_delete(
        &self,
        tx: &mut dyn StoreTx,
        event: &BeforeDelete,
    ) -> Result<Option<DeletionVeto>>;
}
