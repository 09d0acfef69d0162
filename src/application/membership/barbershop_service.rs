use chrono::Utc;
use tracing::{debug, info};

use crate::application::errors::{ConflictReason, Resource, Result, SchedulingError};
use crate::application::lookup::{
    barber_by_email, barber_by_email_for_update, barber_by_id_for_update, barbershop_by_id,
    barbershop_by_id_for_update, begin, commit, lock_members,
};
use crate::application::ServiceDependencies;
use crate::domain::{
    membership, AddHighlight, Barber, Barbershop, BarbershopId, CreateBarbershop, Highlight,
    HighlightId, UpdateBarbershop,
};

/// Open a barbershop; the requesting barber becomes its owner.
///
/// # Arguments
/// * `owner_email` - email of the barber opening the shop
/// * `cmd` - name, registration number and address
///
/// # Returns
/// Id of the new barbershop
///
/// # Errors
/// - NotFound(Barber): unknown barber
/// - ReferenceConflict(AlreadyMember): the barber already belongs to a shop
/// - ReferenceConflict(RegistrationNumberTaken): another shop uses the number
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn create_barbershop(
    deps: &ServiceDependencies,
    owner_email: &str,
    cmd: CreateBarbershop,
) -> Result<BarbershopId> {
    let mut tx = begin(deps).await?;
    let barber = barber_by_email_for_update(tx.as_mut(), owner_email).await?;

    let (barbershop, owner) = membership::open_barbershop(&barber, &cmd, Utc::now())?;

    let taken = tx
        .barbershops()
        .find_by_registration_number(&cmd.registration_number)
        .await
        .map_err(SchedulingError::store)?;
    if taken.is_some() {
        return Err(ConflictReason::RegistrationNumberTaken.into());
    }

    tx.barbershops()
        .save(&barbershop)
        .await
        .map_err(SchedulingError::store)?;
    tx.barbers()
        .save(&owner)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        barbershop_id = %barbershop.barbershop_id,
        owner_id = %owner.barber_id,
        "Barbershop created"
    );
    Ok(barbershop.barbershop_id)
}

/// Change name or address of the owner's barbershop. Unset fields keep
/// their value.
///
/// # Errors
/// - ReferenceConflict(RequesterNotOwner): the barber owns no barbershop
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn update_barbershop(
    deps: &ServiceDependencies,
    owner_email: &str,
    cmd: UpdateBarbershop,
) -> Result<Barbershop> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), owner_email).await?;
    let barbershop_id = membership::owned_barbershop(&owner)?;
    let current = barbershop_by_id_for_update(tx.as_mut(), barbershop_id).await?;

    let updated = current.apply_update(&cmd, Utc::now());
    tx.barbershops()
        .save(&updated)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(%barbershop_id, "Barbershop updated");
    Ok(updated)
}

#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn get_barbershop(
    deps: &ServiceDependencies,
    barbershop_id: BarbershopId,
) -> Result<Barbershop> {
    let mut tx = begin(deps).await?;
    let barbershop = barbershop_by_id(tx.as_mut(), barbershop_id).await?;
    commit(tx).await?;
    Ok(barbershop)
}

#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn list_barbershops(deps: &ServiceDependencies) -> Result<Vec<Barbershop>> {
    let mut tx = begin(deps).await?;
    let barbershops = tx
        .barbershops()
        .list()
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    debug!(count = barbershops.len(), "Listed barbershops");
    Ok(barbershops)
}

/// Owner and staff of a barbershop.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn list_barbers(
    deps: &ServiceDependencies,
    barbershop_id: BarbershopId,
) -> Result<Vec<Barber>> {
    let mut tx = begin(deps).await?;
    barbershop_by_id(tx.as_mut(), barbershop_id).await?;
    let barbers = tx
        .barbers()
        .list_by_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;
    Ok(barbers)
}

/// Close the owner's barbershop for good.
///
/// Requires the owner's password and no scheduled appointment left in the
/// shop. Then, in one transaction and in this order: every staff member is
/// detached, activities, highlights and pending join requests are deleted,
/// the owner is reset and the shop itself is deleted. Past appointments are
/// kept.
///
/// # Arguments
/// * `deps` - service dependencies
/// * `owner_email` - email of the requesting owner
/// * `password` - the owner's plain text password
///
/// # Errors
/// - NotFound(Barber): no barber with that email
/// - ReferenceConflict(RequesterNotOwner): the barber owns no barbershop
/// - ReferenceConflict(InvalidPassword): the password does not match
/// - ReferenceConflict(BarbershopHasScheduledAppointments): a member still
///   has a scheduled appointment
///
/// The shop row, the owner and every member are locked before the
/// scheduled-appointment check.
#[tracing::instrument(skip(deps, password), err(level = "warn"))]
pub async fn close_barbershop(
    deps: &ServiceDependencies,
    owner_email: &str,
    password: &str,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), owner_email).await?;
    let barbershop_id = membership::owned_barbershop(&owner)?;

    let verified = deps
        .password_verifier
        .verify(password, &owner.password_hash)
        .await
        .map_err(SchedulingError::password_verifier)?;
    if !verified {
        return Err(ConflictReason::InvalidPassword.into());
    }

    barbershop_by_id_for_update(tx.as_mut(), barbershop_id).await?;
    let owner = barber_by_id_for_update(tx.as_mut(), owner.barber_id).await?;
    membership::ensure_owner_of(&owner, barbershop_id)?;
    let staff = lock_members(tx.as_mut(), barbershop_id, owner.barber_id).await?;

    let pending = tx
        .appointments()
        .exists_scheduled_for_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    if pending {
        return Err(ConflictReason::BarbershopHasScheduledAppointments.into());
    }

    let now = Utc::now();
    for barber in &staff {
        tx.barbers()
            .save(&membership::detach(barber, now))
            .await
            .map_err(SchedulingError::store)?;
    }

    tx.activities()
        .delete_by_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    tx.highlights()
        .delete_by_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    tx.join_requests()
        .delete_by_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    tx.barbers()
        .save(&membership::detach(&owner, now))
        .await
        .map_err(SchedulingError::store)?;
    tx.barbershops()
        .delete(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        %barbershop_id,
        owner_id = %owner.barber_id,
        detached = staff.len(),
        "Barbershop closed"
    );
    Ok(())
}

/// Attach an already uploaded image to the owner's barbershop.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn add_highlight(
    deps: &ServiceDependencies,
    owner_email: &str,
    cmd: AddHighlight,
) -> Result<HighlightId> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), owner_email).await?;
    let barbershop_id = membership::owned_barbershop(&owner)?;
    barbershop_by_id_for_update(tx.as_mut(), barbershop_id).await?;

    let highlight = Highlight::attach(barbershop_id, &cmd, Utc::now());
    tx.highlights()
        .save(&highlight)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(highlight_id = %highlight.highlight_id, %barbershop_id, "Highlight added");
    Ok(highlight.highlight_id)
}

#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn remove_highlight(
    deps: &ServiceDependencies,
    owner_email: &str,
    highlight_id: HighlightId,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), owner_email).await?;
    let highlight = tx
        .highlights()
        .find_by_id(highlight_id)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Highlight))?;
    membership::ensure_owns_resource(&owner, highlight.barbershop_id)?;

    tx.highlights()
        .delete(highlight_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(%highlight_id, "Highlight removed");
    Ok(())
}

#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn list_highlights(
    deps: &ServiceDependencies,
    barbershop_id: BarbershopId,
) -> Result<Vec<Highlight>> {
    let mut tx = begin(deps).await?;
    barbershop_by_id(tx.as_mut(), barbershop_id).await?;
    let highlights = tx
        .highlights()
        .list_by_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;
    Ok(highlights)
}
