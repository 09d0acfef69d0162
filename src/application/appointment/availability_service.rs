use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::application::errors::{ConflictReason, Result, SchedulingError};
use crate::application::lookup::{barber_by_id, begin, commit};
use crate::application::ServiceDependencies;
use crate::domain::{availability, ActivityId, BarberId, DailyAvailability};

/// Bookable start times of a barber on one local day, ascending.
///
/// Recomputed on every call from the barber's work hours and the
/// non-cancelled appointments of that day.
///
/// # Arguments
/// * `barber_id` - barber whose schedule is read
/// * `date` - day in the configured shop offset
/// * `duration_minutes` - length of the block to fit
///
/// # Returns
/// Start times in configured interval steps; empty without work hours
///
/// # Errors
/// - NotFound(Barber): unknown barber
/// - ReferenceConflict(InvalidAvailabilityDuration): zero duration
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn available_slots(
    deps: &ServiceDependencies,
    barber_id: BarberId,
    date: NaiveDate,
    duration_minutes: u32,
) -> Result<Vec<NaiveTime>> {
    if duration_minutes == 0 {
        return Err(ConflictReason::InvalidAvailabilityDuration.into());
    }
    let offset = deps.config.utc_offset;

    let mut tx = begin(deps).await?;
    let barber = barber_by_id(tx.as_mut(), barber_id).await?;

    let Some(window) = availability::day_window(date, offset) else {
        return Ok(Vec::new());
    };
    let booked = tx
        .appointments()
        .overlapping_for_barber(barber_id, &window)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    let slots = availability::available_slots(
        barber.work_hours,
        date,
        duration_minutes,
        deps.config.slot_interval_minutes,
        offset,
        &booked,
    );

    debug!(%barber_id, %date, duration_minutes, count = slots.len(), "Computed slots");
    Ok(slots)
}

/// One entry per calendar day of the month telling whether any slot is left.
///
/// The duration checked is the barber's shortest assigned activity, or the
/// configured default when nothing is assigned.
///
/// # Errors
/// - NotFound(Barber): unknown barber
/// - ReferenceConflict(InvalidMonth): month outside 1..=12
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn monthly_availability(
    deps: &ServiceDependencies,
    barber_id: BarberId,
    year: i32,
    month: u32,
) -> Result<Vec<DailyAvailability>> {
    let days = availability::days_of_month(year, month).ok_or(
        SchedulingError::ReferenceConflict(ConflictReason::InvalidMonth),
    )?;
    let offset = deps.config.utc_offset;

    let mut tx = begin(deps).await?;
    let barber = barber_by_id(tx.as_mut(), barber_id).await?;

    let assigned: Vec<ActivityId> = barber.activity_ids.iter().copied().collect();
    let activities = tx
        .activities()
        .find_by_ids(&assigned)
        .await
        .map_err(SchedulingError::store)?;
    let sample_minutes = activities
        .iter()
        .map(|activity| activity.duration_minutes)
        .min()
        .unwrap_or(deps.config.monthly_sample_minutes);

    let Some(window) = availability::days_window(&days, offset) else {
        return Ok(Vec::new());
    };
    let booked = tx
        .appointments()
        .overlapping_for_barber(barber_id, &window)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    let month_view = availability::monthly_availability(
        barber.work_hours,
        &days,
        sample_minutes,
        deps.config.slot_interval_minutes,
        offset,
        &booked,
    );

    debug!(%barber_id, year, month, sample_minutes, "Computed monthly availability");
    Ok(month_view)
}
