use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{
    Activity, ActivityId, AppointmentId, AppointmentStatus, Barber, BarberId, BarbershopId,
    BookingError, CustomerId, TimeRange, TransitionError,
};

/// Appointment aggregate - one reserved time block
///
/// Invariants:
/// - `time.end() > time.start()` (guaranteed by `TimeRange`)
/// - every activity belongs to `barbershop_id` and was assigned to the barber
///   when the block was booked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: AppointmentId,
    pub barbershop_id: BarbershopId,
    pub barber_id: BarberId,
    pub customer_id: CustomerId,
    pub time: TimeRange,
    pub status: AppointmentStatus,
    pub activity_ids: BTreeSet<ActivityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn start_time(&self) -> DateTime<Utc> {
        self.time.start()
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.time.end()
    }
}

/// A validated booking request: where, with whom, what and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPlan {
    pub barbershop_id: BarbershopId,
    pub barber_id: BarberId,
    pub activity_ids: BTreeSet<ActivityId>,
    pub time: TimeRange,
}

/// Pure function: validate a booking against the barber and the resolved
/// activities, and derive its time block.
///
/// Business rules:
/// - at least one activity
/// - the barber is a member of `barbershop_id`
/// - every activity is offered by `barbershop_id` and assigned to the barber
/// - the end time is the start plus the summed activity durations
/// - the whole block fits inside the barber's work hours, read at `offset`
///
/// Schedule overlap is not checked here; it needs the stored appointments.
pub fn plan_booking(
    barbershop_id: BarbershopId,
    barber: &Barber,
    activities: &[Activity],
    start_time: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<BookingPlan, BookingError> {
    if activities.is_empty() {
        return Err(BookingError::NoActivities);
    }

    if !barber.is_member_of(barbershop_id) {
        return Err(BookingError::BarberNotMember);
    }

    let mut total_minutes: u32 = 0;
    for activity in activities {
        if activity.barbershop_id != barbershop_id {
            return Err(BookingError::ActivityNotInBarbershop);
        }
        if !barber.can_perform(activity.activity_id) {
            return Err(BookingError::ActivityNotAssigned);
        }
        total_minutes = total_minutes
            .checked_add(activity.duration_minutes)
            .ok_or(BookingError::InvalidDuration)?;
    }

    let time = TimeRange::starting_at(start_time, total_minutes)?;

    let work_hours = barber
        .work_hours
        .ok_or(BookingError::WorkHoursNotConfigured)?;
    if !work_hours.contains(&time, offset) {
        return Err(BookingError::OutsideWorkHours);
    }

    Ok(BookingPlan {
        barbershop_id,
        barber_id: barber.barber_id,
        activity_ids: activities.iter().map(|a| a.activity_id).collect(),
        time,
    })
}

/// Pure function: create a scheduled appointment from a validated plan.
pub fn schedule(plan: BookingPlan, customer_id: CustomerId, now: DateTime<Utc>) -> Appointment {
    Appointment {
        appointment_id: AppointmentId::new(),
        barbershop_id: plan.barbershop_id,
        barber_id: plan.barber_id,
        customer_id,
        time: plan.time,
        status: AppointmentStatus::Scheduled,
        activity_ids: plan.activity_ids,
        created_at: now,
        updated_at: now,
    }
}

/// Pure function: move a scheduled appointment to a new plan.
///
/// Identity, customer and creation time are kept.
pub fn reschedule(
    appointment: &Appointment,
    plan: BookingPlan,
    now: DateTime<Utc>,
) -> Result<Appointment, TransitionError> {
    ensure_scheduled(appointment)?;

    Ok(Appointment {
        barbershop_id: plan.barbershop_id,
        barber_id: plan.barber_id,
        time: plan.time,
        activity_ids: plan.activity_ids,
        updated_at: now,
        ..appointment.clone()
    })
}

/// Pure function: Scheduled -> Cancelled
pub fn cancel(
    appointment: &Appointment,
    now: DateTime<Utc>,
) -> Result<Appointment, TransitionError> {
    transition(appointment, AppointmentStatus::Cancelled, now)
}

/// Pure function: Scheduled -> Concluded
pub fn conclude(
    appointment: &Appointment,
    now: DateTime<Utc>,
) -> Result<Appointment, TransitionError> {
    transition(appointment, AppointmentStatus::Concluded, now)
}

fn transition(
    appointment: &Appointment,
    to: AppointmentStatus,
    now: DateTime<Utc>,
) -> Result<Appointment, TransitionError> {
    ensure_scheduled(appointment)?;

    Ok(Appointment {
        status: to,
        updated_at: now,
        ..appointment.clone()
    })
}

fn ensure_scheduled(appointment: &Appointment) -> Result<(), TransitionError> {
    if appointment.status.is_terminal() {
        return Err(TransitionError::NotScheduled);
    }
    Ok(())
}
