use async_trait::async_trait;

use crate::domain::{BeforeDelete, DeletionVeto};
use crate::ports::store::Result;
use crate::ports::{DeletionListener, StoreTx};

/// Vetoes deleting an account that any appointment still points at.
///
/// Appointments are history; they outlive barbershops but not the barber or
/// customer they name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentReferenceGuard;

#[async_trait]
impl DeletionListener for AppointmentReferenceGuard {
    async fn before_delete(
        &self,
        tx: &mut dyn StoreTx,
        event: &BeforeDelete,
    ) -> Result<Option<DeletionVeto>> {
        let veto = match *event {
            BeforeDelete::Barber(barber_id) => tx
                .appointments()
                .any_for_barber(barber_id)
                .await?
                .then_some(DeletionVeto::BarberReferenced),
            BeforeDelete::Customer(customer_id) => tx
                .appointments()
                .any_for_customer(customer_id)
                .await?
                .then_some(DeletionVeto::CustomerReferenced),
        };
        if let Some(veto) = veto {
            tracing::debug!(?event, ?veto, "Deletion vetoed");
        }
        Ok(veto)
    }
}
