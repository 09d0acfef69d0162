use tracing::info;

use crate::application::errors::{ConflictReason, Result, SchedulingError};
use crate::application::lookup::{barber_by_email_for_update, begin, commit, customer_by_email};
use crate::application::ServiceDependencies;
use crate::domain::BeforeDelete;
use crate::ports::StoreTx;

/// Delete the calling barber's account.
///
/// Owners close their barbershop first. Every deletion listener is asked
/// inside the same transaction and any veto aborts the deletion. The barber
/// row is locked first, so a booking cannot land between the veto check and
/// the delete.
///
/// # Errors
/// - NotFound(Barber): unknown barber
/// - ReferenceConflict(OwnerMustCloseBarbershop): the barber owns a shop
/// - ReferenceConflict: a listener's veto, e.g. `BarberReferenced`
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn delete_barber(deps: &ServiceDependencies, email: &str) -> Result<()> {
    let mut tx = begin(deps).await?;
    let barber = barber_by_email_for_update(tx.as_mut(), email).await?;

    if barber.is_owner {
        return Err(ConflictReason::OwnerMustCloseBarbershop.into());
    }
    notify_listeners(deps, tx.as_mut(), BeforeDelete::Barber(barber.barber_id)).await?;

    tx.join_requests()
        .delete_by_barber(barber.barber_id)
        .await
        .map_err(SchedulingError::store)?;
    tx.barbers()
        .delete(barber.barber_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(barber_id = %barber.barber_id, "Barber account deleted");
    Ok(())
}

/// Delete the calling customer's account, subject to the deletion listeners.
///
/// The customer's schedule is locked before the listeners are asked.
///
/// # Errors
/// - NotFound(Customer): unknown customer
/// - ReferenceConflict: a listener's veto, e.g. `CustomerReferenced`
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn delete_customer(deps: &ServiceDependencies, email: &str) -> Result<()> {
    let mut tx = begin(deps).await?;
    let customer = customer_by_email(tx.as_mut(), email).await?;
    tx.lock_customer_schedule(customer.customer_id)
        .await
        .map_err(SchedulingError::store)?;

    notify_listeners(deps, tx.as_mut(), BeforeDelete::Customer(customer.customer_id)).await?;

    tx.customers()
        .delete(customer.customer_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(customer_id = %customer.customer_id, "Customer account deleted");
    Ok(())
}

async fn notify_listeners(
    deps: &ServiceDependencies,
    tx: &mut dyn StoreTx,
    event: BeforeDelete,
) -> Result<()> {
    for listener in &deps.deletion_listeners {
        let veto = listener
            .before_delete(tx, &event)
            .await
            .map_err(SchedulingError::store)?;
        if let Some(veto) = veto {
            return Err(veto.into());
        }
    }
    Ok(())
}
