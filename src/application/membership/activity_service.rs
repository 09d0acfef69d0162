use chrono::Utc;
use tracing::info;

use crate::application::errors::{ConflictReason, Result, SchedulingError};
use crate::application::lookup::{
    activity_by_id, barber_by_email, barber_by_email_for_update, barbershop_by_id,
    barbershop_by_id_for_update, begin, commit, lock_members,
};
use crate::application::ServiceDependencies;
use crate::domain::{
    membership, Activity, ActivityId, BarbershopId, CreateActivity, UpdateActivity,
};

/// Publish a service in the owner's barbershop.
///
/// # Returns
/// Id of the new activity
///
/// # Errors
/// - ReferenceConflict(RequesterNotOwner): the barber owns no barbershop
/// - ReferenceConflict(InvalidActivityDuration): zero duration
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn create_activity(
    deps: &ServiceDependencies,
    owner_email: &str,
    cmd: CreateActivity,
) -> Result<ActivityId> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), owner_email).await?;
    let barbershop_id = membership::owned_barbershop(&owner)?;
    barbershop_by_id_for_update(tx.as_mut(), barbershop_id).await?;

    let activity = Activity::publish(barbershop_id, &cmd, Utc::now())
        .ok_or(SchedulingError::ReferenceConflict(ConflictReason::InvalidActivityDuration))?;
    tx.activities()
        .save(&activity)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        activity_id = %activity.activity_id,
        %barbershop_id,
        duration_minutes = activity.duration_minutes,
        "Activity created"
    );
    Ok(activity.activity_id)
}

/// Existing appointments keep the end time they were booked with.
///
/// # Errors
/// - NotFound: unknown owner or activity
/// - ReferenceConflict(ForeignResource): activity of another shop
/// - ReferenceConflict(InvalidActivityDuration): zero duration
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn update_activity(
    deps: &ServiceDependencies,
    owner_email: &str,
    activity_id: ActivityId,
    cmd: UpdateActivity,
) -> Result<Activity> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), owner_email).await?;
    let current = activity_by_id(tx.as_mut(), activity_id).await?;
    let barbershop_id = membership::ensure_owns_resource(&owner, current.barbershop_id)?;
    barbershop_by_id_for_update(tx.as_mut(), barbershop_id).await?;
    let current = activity_by_id(tx.as_mut(), activity_id).await?;

    let updated = current
        .apply_update(&cmd, Utc::now())
        .ok_or(SchedulingError::ReferenceConflict(ConflictReason::InvalidActivityDuration))?;
    tx.activities()
        .save(&updated)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(%activity_id, "Activity updated");
    Ok(updated)
}

/// Delete an activity and drop it from every barber's assignments.
///
/// Refused while a scheduled appointment still uses it. The owner and every
/// member are locked before that check.
///
/// # Errors
/// - NotFound: unknown owner or activity
/// - ReferenceConflict(ForeignResource): activity of another shop
/// - ReferenceConflict(ActivityHasScheduledAppointments): still booked
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn delete_activity(
    deps: &ServiceDependencies,
    owner_email: &str,
    activity_id: ActivityId,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email_for_update(tx.as_mut(), owner_email).await?;
    let activity = activity_by_id(tx.as_mut(), activity_id).await?;
    let barbershop_id = membership::ensure_owns_resource(&owner, activity.barbershop_id)?;
    let staff = lock_members(tx.as_mut(), barbershop_id, owner.barber_id).await?;

    let in_use = tx
        .appointments()
        .exists_scheduled_for_activity(activity_id)
        .await
        .map_err(SchedulingError::store)?;
    if in_use {
        return Err(ConflictReason::ActivityHasScheduledAppointments.into());
    }

    let now = Utc::now();
    let holders = std::iter::once(owner)
        .chain(staff)
        .filter(|barber| barber.can_perform(activity_id));
    for mut barber in holders {
        barber.activity_ids.remove(&activity_id);
        barber.updated_at = now;
        tx.barbers()
            .save(&barber)
            .await
            .map_err(SchedulingError::store)?;
    }

    tx.activities()
        .delete(activity_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(%activity_id, %barbershop_id, "Activity deleted");
    Ok(())
}

/// Services offered by a barbershop, ordered by name.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn list_activities(
    deps: &ServiceDependencies,
    barbershop_id: BarbershopId,
) -> Result<Vec<Activity>> {
    let mut tx = begin(deps).await?;
    barbershop_by_id(tx.as_mut(), barbershop_id).await?;
    let activities = tx
        .activities()
        .list_by_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;
    Ok(activities)
}
