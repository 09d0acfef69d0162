use chrono::{DateTime, Utc};
use tracing::debug;

use crate::application::errors::{ConflictReason, Result, SchedulingError};
use crate::application::lookup::{begin, commit};
use crate::application::ServiceDependencies;
use crate::domain::{conflict, AppointmentId, BarberId, BookingPlan, CustomerId, TimeRange};
use crate::ports::StoreTx;

/// Does `[start, end)` overlap a non-cancelled appointment of the barber?
///
/// `exclude` skips one appointment, the one being moved.
///
/// # Errors
/// - ReferenceConflict(InvalidTimeRange): `end` is not after `start`
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn has_conflict(
    deps: &ServiceDependencies,
    barber_id: BarberId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<AppointmentId>,
) -> Result<bool> {
    let range = TimeRange::new(start, end)?;
    let mut tx = begin(deps).await?;
    let conflict = barber_conflict(tx.as_mut(), barber_id, &range, exclude).await?;
    commit(tx).await?;

    debug!(%barber_id, conflict, "Checked barber schedule");
    Ok(conflict)
}

/// Same rule as `has_conflict`, over the customer's own appointments.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn has_customer_conflict(
    deps: &ServiceDependencies,
    customer_id: CustomerId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<AppointmentId>,
) -> Result<bool> {
    let range = TimeRange::new(start, end)?;
    let mut tx = begin(deps).await?;
    let conflict = customer_conflict(tx.as_mut(), customer_id, &range, exclude).await?;
    commit(tx).await?;

    debug!(%customer_id, conflict, "Checked customer schedule");
    Ok(conflict)
}

pub(super) async fn barber_conflict(
    tx: &mut dyn StoreTx,
    barber_id: BarberId,
    range: &TimeRange,
    exclude: Option<AppointmentId>,
) -> Result<bool> {
    let existing = tx
        .appointments()
        .overlapping_for_barber(barber_id, range)
        .await
        .map_err(SchedulingError::store)?;
    Ok(conflict::has_conflict(&existing, range, exclude))
}

pub(super) async fn customer_conflict(
    tx: &mut dyn StoreTx,
    customer_id: CustomerId,
    range: &TimeRange,
    exclude: Option<AppointmentId>,
) -> Result<bool> {
    let existing = tx
        .appointments()
        .overlapping_for_customer(customer_id, range)
        .await
        .map_err(SchedulingError::store)?;
    Ok(conflict::has_conflict(&existing, range, exclude))
}

/// Lock both schedules, then reject the plan if either is taken.
///
/// Locks are held until the transaction ends.
pub(super) async fn ensure_schedule_free(
    tx: &mut dyn StoreTx,
    plan: &BookingPlan,
    customer_id: CustomerId,
    exclude: Option<AppointmentId>,
) -> Result<()> {
    tx.lock_barber_schedule(plan.barber_id)
        .await
        .map_err(SchedulingError::store)?;
    tx.lock_customer_schedule(customer_id)
        .await
        .map_err(SchedulingError::store)?;

    if barber_conflict(tx, plan.barber_id, &plan.time, exclude).await? {
        return Err(ConflictReason::BarberScheduleOverlap.into());
    }
    if customer_conflict(tx, customer_id, &plan.time, exclude).await? {
        return Err(ConflictReason::CustomerScheduleOverlap.into());
    }
    Ok(())
}
