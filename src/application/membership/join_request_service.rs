use chrono::Utc;
use tracing::{debug, info};

use crate::application::errors::{Resource, Result, SchedulingError};
use crate::application::lookup::{
    barber_by_email, barber_by_id_for_update, barbershop_by_id_for_update, begin, commit,
};
use crate::application::ServiceDependencies;
use crate::domain::{membership, Barber, JoinRequest, JoinRequestId};
use crate::ports::StoreTx;

/// File a request of the calling barber to join the shop with
/// `registration_number`.
///
/// # Returns
/// Id of the pending request
///
/// # Errors
/// - NotFound: unknown barber or registration number
/// - ReferenceConflict(AlreadyMember): the barber already belongs to a shop
/// - ReferenceConflict(JoinRequestAlreadyPending): a request to this shop is open
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn request_to_join(
    deps: &ServiceDependencies,
    barber_email: &str,
    registration_number: &str,
) -> Result<JoinRequestId> {
    let mut tx = begin(deps).await?;
    let barber = barber_by_email(tx.as_mut(), barber_email).await?;
    let barbershop = tx
        .barbershops()
        .find_by_registration_number(registration_number)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Barbershop))?;
    barbershop_by_id_for_update(tx.as_mut(), barbershop.barbershop_id).await?;

    let pending = tx
        .join_requests()
        .find_pending(barber.barber_id, barbershop.barbershop_id)
        .await
        .map_err(SchedulingError::store)?;

    let request = membership::file_join_request(
        &barber,
        barbershop.barbershop_id,
        pending.is_some(),
        Utc::now(),
    )?;
    tx.join_requests()
        .save(&request)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        join_request_id = %request.join_request_id,
        barber_id = %barber.barber_id,
        barbershop_id = %barbershop.barbershop_id,
        "Join request filed"
    );
    Ok(request.join_request_id)
}

/// Link the requesting barber to the owner's shop and drop the request.
///
/// If the barber joined another shop in the meantime the approval fails and
/// the request is kept.
///
/// # Errors
/// - NotFound: unknown owner, request or barber
/// - ReferenceConflict(RequesterNotOwner): the request targets another shop
/// - ReferenceConflict(AlreadyMember): the barber belongs to a shop by now
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn approve_join_request(
    deps: &ServiceDependencies,
    owner_email: &str,
    join_request_id: JoinRequestId,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), owner_email).await?;
    let request = addressed_request(tx.as_mut(), &owner, join_request_id).await?;
    let barber = barber_by_id_for_update(tx.as_mut(), request.barber_id).await?;

    let joined = membership::approve_join_request(&owner, &request, &barber, Utc::now())?;
    tx.barbers()
        .save(&joined)
        .await
        .map_err(SchedulingError::store)?;
    tx.join_requests()
        .delete(join_request_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        %join_request_id,
        barber_id = %joined.barber_id,
        barbershop_id = %request.barbershop_id,
        "Join request approved"
    );
    Ok(())
}

/// Drop a pending request without changing any membership.
///
/// # Errors
/// - NotFound: unknown owner or request
/// - ReferenceConflict(RequesterNotOwner): the request targets another shop
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn reject_join_request(
    deps: &ServiceDependencies,
    owner_email: &str,
    join_request_id: JoinRequestId,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), owner_email).await?;
    let request = addressed_request(tx.as_mut(), &owner, join_request_id).await?;

    membership::reject_join_request(&owner, &request)?;
    tx.join_requests()
        .delete(join_request_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(%join_request_id, "Join request rejected");
    Ok(())
}

/// Pending requests addressed to the owner's shop, oldest first.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn pending_join_requests(
    deps: &ServiceDependencies,
    owner_email: &str,
) -> Result<Vec<JoinRequest>> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), owner_email).await?;
    let barbershop_id = membership::owned_barbershop(&owner)?;
    let requests = tx
        .join_requests()
        .list_pending_for_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    debug!(%barbershop_id, count = requests.len(), "Listed pending join requests");
    Ok(requests)
}

/// Requests the calling barber has filed and that are still open.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn join_request_history(
    deps: &ServiceDependencies,
    barber_email: &str,
) -> Result<Vec<JoinRequest>> {
    let mut tx = begin(deps).await?;
    let barber = barber_by_email(tx.as_mut(), barber_email).await?;
    let requests = tx
        .join_requests()
        .list_for_barber(barber.barber_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;
    Ok(requests)
}

async fn request_by_id(
    tx: &mut dyn StoreTx,
    join_request_id: JoinRequestId,
) -> Result<JoinRequest> {
    tx.join_requests()
        .find_by_id(join_request_id)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::JoinRequest))
}

/// Resolve a request addressed to `owner`'s shop and lock that shop.
///
/// The request is read again once the lock is held, so a decision taken
/// meanwhile by another call surfaces as `NotFound`.
async fn addressed_request(
    tx: &mut dyn StoreTx,
    owner: &Barber,
    join_request_id: JoinRequestId,
) -> Result<JoinRequest> {
    let request = request_by_id(tx, join_request_id).await?;
    membership::ensure_owner_of(owner, request.barbershop_id)?;
    barbershop_by_id_for_update(tx, request.barbershop_id).await?;
    request_by_id(tx, join_request_id).await
}
