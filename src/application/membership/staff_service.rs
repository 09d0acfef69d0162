use chrono::Utc;
use tracing::{debug, info};

use crate::application::errors::{Result, SchedulingError};
use crate::application::lookup::{
    activities_by_ids, barber_by_email_for_update, barber_by_id, barber_by_id_for_update, begin,
    commit,
};
use crate::application::ServiceDependencies;
use crate::domain::{
    membership, Activity, ActivityId, Barber, BarberId, SetWorkHours, WorkHours,
};

/// The calling barber leaves its shop and loses every activity assignment.
///
/// A barber without a shop is left untouched.
///
/// # Errors
/// - NotFound(Barber): unknown barber
/// - ReferenceConflict(OwnerCannotLeave): owners close the shop instead
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn leave_barbershop(deps: &ServiceDependencies, barber_email: &str) -> Result<()> {
    let mut tx = begin(deps).await?;
    let barber = barber_by_email_for_update(tx.as_mut(), barber_email).await?;

    let Some(left) = membership::leave_barbershop(&barber, Utc::now())? else {
        debug!(barber_id = %barber.barber_id, "No membership to leave");
        return Ok(());
    };
    tx.barbers()
        .save(&left)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        barber_id = %barber.barber_id,
        barbershop_id = ?barber.barbershop_id,
        "Barber left barbershop"
    );
    Ok(())
}

/// Owner-forced leave of one staff member.
///
/// # Errors
/// - NotFound(Barber): unknown owner or target
/// - ReferenceConflict(RequesterNotOwner): the requester owns no shop
/// - ReferenceConflict(OwnerCannotRemoveSelf): the target is the owner
/// - ReferenceConflict(BarberNotInBarbershop): the target works elsewhere
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn remove_barber(
    deps: &ServiceDependencies,
    owner_email: &str,
    barber_id: BarberId,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email_for_update(tx.as_mut(), owner_email).await?;
    let target = barber_by_id_for_update(tx.as_mut(), barber_id).await?;

    let removed = membership::remove_from_barbershop(&owner, &target, Utc::now())?;
    tx.barbers()
        .save(&removed)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(%barber_id, owner_id = %owner.barber_id, "Barber removed from barbershop");
    Ok(())
}

/// Replace the calling barber's assigned activities.
///
/// # Arguments
/// * `barber_email` - email of the barber
/// * `activity_ids` - the complete new set; duplicates collapse
///
/// # Errors
/// - NotFound: unknown barber or activity
/// - ReferenceConflict(NotMember): the barber has no shop
/// - ReferenceConflict(ForeignResource): an activity of another shop
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn assign_activities(
    deps: &ServiceDependencies,
    barber_email: &str,
    activity_ids: Vec<ActivityId>,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let barber = barber_by_email_for_update(tx.as_mut(), barber_email).await?;
    let activities = activities_by_ids(tx.as_mut(), &activity_ids).await?;

    let updated = membership::assign_activities(&barber, &activities, Utc::now())?;
    tx.barbers()
        .save(&updated)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        barber_id = %barber.barber_id,
        count = updated.activity_ids.len(),
        "Activities assigned"
    );
    Ok(())
}

#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn assigned_activities(
    deps: &ServiceDependencies,
    barber_id: BarberId,
) -> Result<Vec<Activity>> {
    let mut tx = begin(deps).await?;
    let barber = barber_by_id(tx.as_mut(), barber_id).await?;
    let ids: Vec<ActivityId> = barber.activity_ids.iter().copied().collect();
    let activities = tx
        .activities()
        .find_by_ids(&ids)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;
    Ok(activities)
}

/// Set the calling barber's daily working window.
///
/// # Errors
/// - ReferenceConflict(InvalidWorkHours): start is not before end
/// - NotFound(Barber): unknown barber
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn set_work_hours(
    deps: &ServiceDependencies,
    barber_email: &str,
    cmd: SetWorkHours,
) -> Result<()> {
    let work_hours = WorkHours::new(cmd.start, cmd.end)?;

    let mut tx = begin(deps).await?;
    let barber = barber_by_email_for_update(tx.as_mut(), barber_email).await?;
    let updated = Barber {
        work_hours: Some(work_hours),
        updated_at: Utc::now(),
        ..barber
    };
    tx.barbers()
        .save(&updated)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        barber_id = %updated.barber_id,
        start = %cmd.start,
        end = %cmd.end,
        "Work hours set"
    );
    Ok(())
}
