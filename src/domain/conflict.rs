use super::{Appointment, AppointmentId, TimeRange};

/// Pure function: does `range` collide with any appointment in `existing`?
///
/// A collision is a half-open overlap with an appointment that still blocks
/// the schedule (anything but cancelled). `exclude` skips the appointment
/// being rescheduled.
pub fn has_conflict(
    existing: &[Appointment],
    range: &TimeRange,
    exclude: Option<AppointmentId>,
) -> bool {
    existing.iter().any(|appointment| {
        Some(appointment.appointment_id) != exclude
            && appointment.status.blocks_schedule()
            && appointment.time.overlaps(range)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppointmentStatus, BarberId, BarbershopId, CustomerId};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn booked(start: DateTime<Utc>, end: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment {
            appointment_id: AppointmentId::new(),
            barbershop_id: BarbershopId::new(),
            barber_id: BarberId::new(),
            customer_id: CustomerId::new(),
            time: TimeRange::new(start, end).unwrap(),
            status,
            activity_ids: BTreeSet::new(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_overlap_with_scheduled_appointment_conflicts() {
        let existing = vec![booked(at(9, 30), at(10, 0), AppointmentStatus::Scheduled)];
        let range = TimeRange::new(at(9, 15), at(9, 45)).unwrap();

        assert!(has_conflict(&existing, &range, None));
    }

    #[test]
    fn test_adjacent_blocks_do_not_conflict() {
        let existing = vec![booked(at(9, 30), at(10, 0), AppointmentStatus::Scheduled)];

        let before = TimeRange::new(at(9, 0), at(9, 30)).unwrap();
        let after = TimeRange::new(at(10, 0), at(10, 30)).unwrap();

        assert!(!has_conflict(&existing, &before, None));
        assert!(!has_conflict(&existing, &after, None));
    }

    #[test]
    fn test_cancelled_appointments_free_their_block() {
        let existing = vec![booked(at(9, 30), at(10, 0), AppointmentStatus::Cancelled)];
        let range = TimeRange::new(at(9, 30), at(10, 0)).unwrap();

        assert!(!has_conflict(&existing, &range, None));
    }

    #[test]
    fn test_concluded_appointments_still_block() {
        let existing = vec![booked(at(9, 30), at(10, 0), AppointmentStatus::Concluded)];
        let range = TimeRange::new(at(9, 45), at(10, 15)).unwrap();

        assert!(has_conflict(&existing, &range, None));
    }

    #[test]
    fn test_excluded_appointment_is_ignored() {
        let own = booked(at(9, 30), at(10, 0), AppointmentStatus::Scheduled);
        let own_id = own.appointment_id;
        let existing = vec![own];
        let range = TimeRange::new(at(9, 45), at(10, 15)).unwrap();

        assert!(!has_conflict(&existing, &range, Some(own_id)));
        assert!(has_conflict(&existing, &range, Some(AppointmentId::new())));
    }
}
