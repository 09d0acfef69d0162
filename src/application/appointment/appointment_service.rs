use chrono::Utc;
use tracing::{debug, info};

use super::conflict_service::ensure_schedule_free;
use crate::application::errors::{ConflictReason, Result, SchedulingError};
use crate::application::lookup::{
    activities_by_ids, appointment_by_id, appointment_by_id_for_update, barber_by_email,
    barber_by_id_for_update, barbershop_by_id, begin, commit, customer_by_email,
};
use crate::application::ServiceDependencies;
use crate::domain::{
    appointment, commands::BookAppointment, Appointment, AppointmentId, BookingPlan,
};
use crate::ports::StoreTx;

/// Book an appointment for the requesting customer.
///
/// Business rules:
/// - shop, barber and every activity exist
/// - the barber is a member of the shop and assigned every activity
/// - the block fits the barber's work hours
/// - neither the barber nor the customer has an overlapping appointment
///
/// Not idempotent: a retried call books a second appointment or fails with
/// an overlap.
///
/// # Arguments
/// * `deps` - service dependencies
/// * `cmd` - shop, barber, activities and start time
/// * `requester_email` - email of the booking customer
///
/// # Returns
/// Id of the new appointment, in status Scheduled
///
/// # Errors
/// - NotFound: unknown customer, shop, barber or activity
/// - ReferenceConflict: a booking rule above failed
/// - Store: persistence failure
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn book_appointment(
    deps: &ServiceDependencies,
    cmd: BookAppointment,
    requester_email: &str,
) -> Result<AppointmentId> {
    let mut tx = begin(deps).await?;
    let customer = customer_by_email(tx.as_mut(), requester_email).await?;

    let plan = plan_for(tx.as_mut(), deps, &cmd).await?;
    ensure_schedule_free(tx.as_mut(), &plan, customer.customer_id, None).await?;

    let appointment = appointment::schedule(plan, customer.customer_id, Utc::now());
    tx.appointments()
        .save(&appointment)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        appointment_id = %appointment.appointment_id,
        barber_id = %appointment.barber_id,
        customer_id = %appointment.customer_id,
        start = %appointment.start_time(),
        end = %appointment.end_time(),
        "Appointment booked"
    );
    Ok(appointment.appointment_id)
}

/// Move an appointment to a new barber, activity set or time.
///
/// Only the appointment's customer may do it, and only while it is
/// scheduled. The appointment does not conflict with itself.
///
/// # Arguments
/// * `appointment_id` - appointment to move
/// * `cmd` - the new booking, validated like `book_appointment`
/// * `requester_email` - email of the appointment's customer
///
/// # Errors
/// - NotFound: unknown customer, appointment, shop, barber or activity
/// - ReferenceConflict(RequesterNotCustomer): someone else's appointment
/// - ReferenceConflict(AppointmentNotScheduled): concluded or cancelled
/// - ReferenceConflict: any booking rule of the new plan
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn reschedule_appointment(
    deps: &ServiceDependencies,
    appointment_id: AppointmentId,
    cmd: BookAppointment,
    requester_email: &str,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let customer = customer_by_email(tx.as_mut(), requester_email).await?;
    let current = appointment_by_id_for_update(tx.as_mut(), appointment_id).await?;

    if current.customer_id != customer.customer_id {
        return Err(ConflictReason::RequesterNotCustomer.into());
    }
    if current.status.is_terminal() {
        return Err(ConflictReason::AppointmentNotScheduled.into());
    }

    let plan = plan_for(tx.as_mut(), deps, &cmd).await?;
    ensure_schedule_free(tx.as_mut(), &plan, customer.customer_id, Some(appointment_id)).await?;

    let updated = appointment::reschedule(&current, plan, Utc::now())?;
    tx.appointments()
        .save(&updated)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(
        %appointment_id,
        barber_id = %updated.barber_id,
        start = %updated.start_time(),
        end = %updated.end_time(),
        "Appointment rescheduled"
    );
    Ok(())
}

/// Cancel a scheduled appointment.
///
/// Allowed for the customer, the assigned barber and the shop owner. The
/// freed block is bookable again right away.
///
/// # Errors
/// - NotFound(Appointment): unknown appointment
/// - ReferenceConflict(RequesterCannotCancel): the requester is not a participant
/// - ReferenceConflict(AppointmentNotScheduled): already concluded or cancelled
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn cancel_appointment(
    deps: &ServiceDependencies,
    appointment_id: AppointmentId,
    requester_email: &str,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let current = appointment_by_id_for_update(tx.as_mut(), appointment_id).await?;

    if !is_participant(tx.as_mut(), &current, requester_email).await? {
        return Err(ConflictReason::RequesterCannotCancel.into());
    }

    let cancelled = appointment::cancel(&current, Utc::now())?;
    tx.appointments()
        .save(&cancelled)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(%appointment_id, "Appointment cancelled");
    Ok(())
}

/// Mark a scheduled appointment as done. Only the assigned barber may.
///
/// # Errors
/// - NotFound: unknown barber or appointment
/// - ReferenceConflict(RequesterNotBarber): another barber's appointment
/// - ReferenceConflict(AppointmentNotScheduled): already concluded or cancelled
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn conclude_appointment(
    deps: &ServiceDependencies,
    appointment_id: AppointmentId,
    requester_email: &str,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let barber = barber_by_email(tx.as_mut(), requester_email).await?;
    let current = appointment_by_id_for_update(tx.as_mut(), appointment_id).await?;

    if current.barber_id != barber.barber_id {
        return Err(ConflictReason::RequesterNotBarber.into());
    }

    let concluded = appointment::conclude(&current, Utc::now())?;
    tx.appointments()
        .save(&concluded)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(%appointment_id, "Appointment concluded");
    Ok(())
}

/// Physically remove an appointment in any status. Owner only.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn delete_appointment(
    deps: &ServiceDependencies,
    appointment_id: AppointmentId,
    requester_email: &str,
) -> Result<()> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), requester_email).await?;
    let current = appointment_by_id(tx.as_mut(), appointment_id).await?;

    if !owner.owns(current.barbershop_id) {
        return Err(ConflictReason::RequesterNotOwner.into());
    }

    tx.appointments()
        .delete(appointment_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    info!(%appointment_id, status = current.status.as_str(), "Appointment deleted");
    Ok(())
}

/// One appointment, visible to its customer, its barber and the shop owner.
///
/// # Errors
/// - NotFound(Appointment): unknown appointment
/// - ReferenceConflict(RequesterNotParticipant): anyone else
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn get_appointment(
    deps: &ServiceDependencies,
    appointment_id: AppointmentId,
    requester_email: &str,
) -> Result<Appointment> {
    let mut tx = begin(deps).await?;
    let appointment = appointment_by_id(tx.as_mut(), appointment_id).await?;

    if !is_participant(tx.as_mut(), &appointment, requester_email).await? {
        return Err(ConflictReason::RequesterNotParticipant.into());
    }
    commit(tx).await?;

    Ok(appointment)
}

/// The requesting customer's appointments, ordered by start time.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn appointments_for_customer(
    deps: &ServiceDependencies,
    requester_email: &str,
) -> Result<Vec<Appointment>> {
    let mut tx = begin(deps).await?;
    let customer = customer_by_email(tx.as_mut(), requester_email).await?;
    let appointments = tx
        .appointments()
        .list_for_customer(customer.customer_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    debug!(customer_id = %customer.customer_id, count = appointments.len(), "Listed appointments");
    Ok(appointments)
}

/// The requesting barber's appointments, ordered by start time.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn appointments_for_barber(
    deps: &ServiceDependencies,
    requester_email: &str,
) -> Result<Vec<Appointment>> {
    let mut tx = begin(deps).await?;
    let barber = barber_by_email(tx.as_mut(), requester_email).await?;
    let appointments = tx
        .appointments()
        .list_for_barber(barber.barber_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    debug!(barber_id = %barber.barber_id, count = appointments.len(), "Listed appointments");
    Ok(appointments)
}

/// Every appointment of the requester's barbershop. Owner only.
#[tracing::instrument(skip(deps), err(level = "warn"))]
pub async fn appointments_for_barbershop(
    deps: &ServiceDependencies,
    requester_email: &str,
) -> Result<Vec<Appointment>> {
    let mut tx = begin(deps).await?;
    let owner = barber_by_email(tx.as_mut(), requester_email).await?;
    let barbershop_id = owner
        .owned_barbershop()
        .ok_or(SchedulingError::ReferenceConflict(ConflictReason::RequesterNotOwner))?;
    let appointments = tx
        .appointments()
        .list_for_barbershop(barbershop_id)
        .await
        .map_err(SchedulingError::store)?;
    commit(tx).await?;

    debug!(%barbershop_id, count = appointments.len(), "Listed appointments");
    Ok(appointments)
}

/// Resolve shop, barber and activities, then validate them as one booking.
///
/// The barber row is locked before it is read. Membership changes and shop
/// closure lock the same row, so the membership validated here still holds
/// when the appointment is written.
async fn plan_for(
    tx: &mut dyn StoreTx,
    deps: &ServiceDependencies,
    cmd: &BookAppointment,
) -> Result<BookingPlan> {
    barbershop_by_id(tx, cmd.barbershop_id).await?;
    let barber = barber_by_id_for_update(tx, cmd.barber_id).await?;
    let activities = activities_by_ids(tx, &cmd.activity_ids).await?;

    let plan = appointment::plan_booking(
        cmd.barbershop_id,
        &barber,
        &activities,
        cmd.start_time,
        deps.config.utc_offset,
    )?;
    Ok(plan)
}

/// Customer, assigned barber or owner of the appointment's shop.
async fn is_participant(
    tx: &mut dyn StoreTx,
    appointment: &Appointment,
    email: &str,
) -> Result<bool> {
    let customer = tx
        .customers()
        .find_by_email(email)
        .await
        .map_err(SchedulingError::store)?;
    if customer.is_some_and(|c| c.customer_id == appointment.customer_id) {
        return Ok(true);
    }

    let barber = tx
        .barbers()
        .find_by_email(email)
        .await
        .map_err(SchedulingError::store)?;
    Ok(barber.is_some_and(|b| {
        b.barber_id == appointment.barber_id || b.owns(appointment.barbershop_id)
    }))
}
