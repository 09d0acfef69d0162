use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use super::{conflict, Appointment, TimeRange, WorkHours};

/// Whether a calendar day still has at least one bookable start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAvailability {
    pub date: NaiveDate,
    pub has_availability: bool,
}

/// Pure function: bookable start times of one barber on one local day.
///
/// Candidates start at the opening time and advance by `slot_interval_minutes`
/// while they are before closing. A candidate is kept when its block ends no
/// later than closing and does not overlap a blocking appointment in `booked`.
/// Results are ascending.
pub fn available_slots(
    work_hours: Option<WorkHours>,
    date: NaiveDate,
    duration_minutes: u32,
    slot_interval_minutes: u32,
    offset: FixedOffset,
    booked: &[Appointment],
) -> Vec<NaiveTime> {
    let Some(hours) = work_hours else {
        return Vec::new();
    };
    if duration_minutes == 0 || slot_interval_minutes == 0 {
        return Vec::new();
    }

    let opening = date.and_time(hours.start());
    let closing = date.and_time(hours.end());
    let step = Duration::minutes(i64::from(slot_interval_minutes));
    let length = Duration::minutes(i64::from(duration_minutes));

    let mut slots = Vec::new();
    let mut candidate = opening;
    while candidate < closing {
        let slot_end = candidate + length;
        if slot_end > closing {
            break;
        }
        let free = local_range(candidate, slot_end, offset)
            .is_some_and(|range| !conflict::has_conflict(booked, &range, None));
        if free {
            slots.push(candidate.time());
        }
        candidate += step;
    }
    slots
}

/// Pure function: fold the daily generator over every day in `days`.
pub fn monthly_availability(
    work_hours: Option<WorkHours>,
    days: &[NaiveDate],
    sample_minutes: u32,
    slot_interval_minutes: u32,
    offset: FixedOffset,
    booked: &[Appointment],
) -> Vec<DailyAvailability> {
    days.iter()
        .map(|&date| DailyAvailability {
            date,
            has_availability: !available_slots(
                work_hours,
                date,
                sample_minutes,
                slot_interval_minutes,
                offset,
                booked,
            )
            .is_empty(),
        })
        .collect()
}

/// Every calendar day of `month`, or `None` for an invalid year/month.
pub fn days_of_month(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(
        first
            .iter_days()
            .take_while(|day| day.month() == month)
            .collect(),
    )
}

/// The UTC interval covering local `date` from midnight to midnight.
pub fn day_window(date: NaiveDate, offset: FixedOffset) -> Option<TimeRange> {
    let start = date.and_time(NaiveTime::MIN);
    local_range(start, start + Duration::days(1), offset)
}

/// The UTC interval covering every local day in `days` (first to last).
pub fn days_window(days: &[NaiveDate], offset: FixedOffset) -> Option<TimeRange> {
    let first = days.first()?.and_time(NaiveTime::MIN);
    let last = days.last()?.and_time(NaiveTime::MIN) + Duration::days(1);
    local_range(first, last, offset)
}

fn local_range(
    start: NaiveDateTime,
    end: NaiveDateTime,
    offset: FixedOffset,
) -> Option<TimeRange> {
    let start = to_utc(start, offset)?;
    let end = to_utc(end, offset)?;
    TimeRange::new(start, end).ok()
}

fn to_utc(local: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppointmentId, AppointmentStatus, BarberId, BarbershopId, CustomerId};
    use std::collections::BTreeSet;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn hours(open: NaiveTime, close: NaiveTime) -> Option<WorkHours> {
        Some(WorkHours::new(open, close).unwrap())
    }

    fn booked(start: NaiveTime, end: NaiveTime, status: AppointmentStatus) -> Appointment {
        let start = Utc.from_utc_datetime(&monday().and_time(start));
        let end = Utc.from_utc_datetime(&monday().and_time(end));
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
    fn test_full_free_day_walks_every_interval() {
        let slots = available_slots(hours(time(9, 0), time(18, 0)), monday(), 30, 15, utc(), &[]);

        assert_eq!(slots.first(), Some(&time(9, 0)));
        assert_eq!(slots[1], time(9, 15));
        assert_eq!(slots[2], time(9, 30));
        assert_eq!(slots.last(), Some(&time(17, 30)));
        assert_eq!(slots.len(), 35);
    }

    #[test]
    fn test_booked_block_removes_overlapping_candidates() {
        let existing = vec![booked(time(9, 30), time(10, 0), AppointmentStatus::Scheduled)];

        let slots = available_slots(
            hours(time(9, 0), time(11, 0)),
            monday(),
            30,
            15,
            utc(),
            &existing,
        );

        assert_eq!(slots, vec![time(9, 0), time(10, 0), time(10, 15), time(10, 30)]);
    }

    #[test]
    fn test_cancelled_block_is_bookable_again() {
        let existing = vec![booked(time(9, 30), time(10, 0), AppointmentStatus::Cancelled)];

        let slots = available_slots(
            hours(time(9, 0), time(10, 0)),
            monday(),
            30,
            15,
            utc(),
            &existing,
        );

        assert_eq!(slots, vec![time(9, 0), time(9, 15), time(9, 30)]);
    }

    #[test]
    fn test_no_work_hours_means_no_slots() {
        assert!(available_slots(None, monday(), 30, 15, utc(), &[]).is_empty());
    }

    #[test]
    fn test_duration_longer_than_window_yields_nothing() {
        let slots = available_slots(hours(time(9, 0), time(10, 0)), monday(), 90, 15, utc(), &[]);
        assert!(slots.is_empty());
    }

    #[test]
    fn test_slots_are_stable_for_unchanged_state() {
        let existing = vec![booked(time(11, 0), time(12, 0), AppointmentStatus::Scheduled)];
        let work = hours(time(9, 0), time(18, 0));

        let first = available_slots(work, monday(), 45, 15, utc(), &existing);
        let second = available_slots(work, monday(), 45, 15, utc(), &existing);

        assert_eq!(first, second);
    }

    #[test]
    fn test_slots_respect_shop_offset() {
        // 12:00Z-12:30Z is 09:00-09:30 at UTC-3
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();
        let existing = vec![booked(time(12, 0), time(12, 30), AppointmentStatus::Scheduled)];

        let slots = available_slots(
            hours(time(9, 0), time(10, 0)),
            monday(),
            30,
            15,
            sao_paulo,
            &existing,
        );

        assert_eq!(slots, vec![time(9, 30)]);
    }

    #[test]
    fn test_days_of_month_covers_the_whole_month() {
        let february = days_of_month(2024, 2).unwrap();
        assert_eq!(february.len(), 29);
        assert_eq!(february[0], NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(february[28], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        assert!(days_of_month(2024, 13).is_none());
        assert!(days_of_month(2024, 0).is_none());
    }

    #[test]
    fn test_monthly_availability_marks_fully_booked_day() {
        let days = vec![monday(), monday().succ_opt().unwrap()];
        let existing = vec![booked(time(9, 0), time(10, 0), AppointmentStatus::Scheduled)];

        let month = monthly_availability(
            hours(time(9, 0), time(10, 0)),
            &days,
            15,
            15,
            utc(),
            &existing,
        );

        assert_eq!(month.len(), 2);
        assert!(!month[0].has_availability);
        assert!(month[1].has_availability);
    }

    #[test]
    fn test_day_window_spans_local_midnight_to_midnight() {
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();
        let window = day_window(monday(), sao_paulo).unwrap();

        assert_eq!(window.start(), Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap());
        assert_eq!(window.end(), Utc.with_ymd_and_hms(2025, 3, 11, 3, 0, 0).unwrap());
    }
}
