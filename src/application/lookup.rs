//! Transaction and entity resolution helpers shared by the services.
//!
//! The `_for_update` variants hold the row until the transaction ends.
//! Services that take several row locks take them in one order: barbershop,
//! then barbers (the owner before staff, staff by id), then the customer.
//! An appointment row, when locked, comes before all of them.

use std::collections::BTreeSet;

use super::errors::{Resource, Result, SchedulingError};
use super::ServiceDependencies;
use crate::domain::{
    Activity, ActivityId, Appointment, AppointmentId, Barber, BarberId, Barbershop,
    BarbershopId, Customer,
};
use crate::ports::StoreTx;

pub(crate) async fn begin(deps: &ServiceDependencies) -> Result<Box<dyn StoreTx>> {
    deps.store.begin().await.map_err(SchedulingError::store)
}

pub(crate) async fn commit(tx: Box<dyn StoreTx>) -> Result<()> {
    tx.commit().await.map_err(SchedulingError::store)
}

pub(crate) async fn barber_by_email(tx: &mut dyn StoreTx, email: &str) -> Result<Barber> {
    tx.barbers()
        .find_by_email(email)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Barber))
}

pub(crate) async fn barber_by_id(tx: &mut dyn StoreTx, barber_id: BarberId) -> Result<Barber> {
    tx.barbers()
        .find_by_id(barber_id)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Barber))
}

pub(crate) async fn barber_by_email_for_update(
    tx: &mut dyn StoreTx,
    email: &str,
) -> Result<Barber> {
    tx.barbers()
        .find_by_email_for_update(email)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Barber))
}

pub(crate) async fn barber_by_id_for_update(
    tx: &mut dyn StoreTx,
    barber_id: BarberId,
) -> Result<Barber> {
    tx.barbers()
        .find_by_id_for_update(barber_id)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Barber))
}

/// Lock every member of the barbershop except `except`, lowest id first,
/// and return them as they are once locked. A barber who left while we
/// waited is skipped.
pub(crate) async fn lock_members(
    tx: &mut dyn StoreTx,
    barbershop_id: BarbershopId,
    except: BarberId,
) -> Result<Vec<Barber>> {
    let mut ids: Vec<BarberId> = tx
        .barbers()
        .list_by_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?
        .into_iter()
        .map(|barber| barber.barber_id)
        .filter(|barber_id| *barber_id != except)
        .collect();
    ids.sort();

    let mut members = Vec::with_capacity(ids.len());
    for barber_id in ids {
        let locked = tx
            .barbers()
            .find_by_id_for_update(barber_id)
            .await
            .map_err(SchedulingError::store)?;
        if let Some(barber) = locked.filter(|b| b.is_member_of(barbershop_id)) {
            members.push(barber);
        }
    }
    Ok(members)
}

pub(crate) async fn customer_by_email(tx: &mut dyn StoreTx, email: &str) -> Result<Customer> {
    tx.customers()
        .find_by_email(email)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Customer))
}

pub(crate) async fn barbershop_by_id(
    tx: &mut dyn StoreTx,
    barbershop_id: BarbershopId,
) -> Result<Barbershop> {
    tx.barbershops()
        .find_by_id(barbershop_id)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Barbershop))
}

pub(crate) async fn barbershop_by_id_for_update(
    tx: &mut dyn StoreTx,
    barbershop_id: BarbershopId,
) -> Result<Barbershop> {
    tx.barbershops()
        .find_by_id_for_update(barbershop_id)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Barbershop))
}

pub(crate) async fn activity_by_id(
    tx: &mut dyn StoreTx,
    activity_id: ActivityId,
) -> Result<Activity> {
    tx.activities()
        .find_by_id(activity_id)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Activity))
}

/// Resolve every id; duplicates collapse, any missing id is `NotFound`.
pub(crate) async fn activities_by_ids(
    tx: &mut dyn StoreTx,
    activity_ids: &[ActivityId],
) -> Result<Vec<Activity>> {
    let unique: Vec<ActivityId> = activity_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if unique.is_empty() {
        return Ok(Vec::new());
    }

    let activities = tx
        .activities()
        .find_by_ids(&unique)
        .await
        .map_err(SchedulingError::store)?;
    if activities.len() != unique.len() {
        return Err(SchedulingError::NotFound(Resource::Activity));
    }
    Ok(activities)
}

pub(crate) async fn appointment_by_id(
    tx: &mut dyn StoreTx,
    appointment_id: AppointmentId,
) -> Result<Appointment> {
    tx.appointments()
        .find_by_id(appointment_id)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Appointment))
}

pub(crate) async fn appointment_by_id_for_update(
    tx: &mut dyn StoreTx,
    appointment_id: AppointmentId,
) -> Result<Appointment> {
    tx.appointments()
        .find_by_id_for_update(appointment_id)
        .await
        .map_err(SchedulingError::store)?
        .ok_or(SchedulingError::NotFound(Resource::Appointment))
}
