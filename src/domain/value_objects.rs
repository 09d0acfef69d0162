use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{TimeRangeError, WorkHoursError};

/// Declares a UUID-backed identifier for one aggregate.
///
/// Each id only refers to its own aggregate; other aggregates hold it by value
/// instead of navigating to the referenced entity.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Barbershop id
    BarbershopId
);
entity_id!(
    /// Barber id (staff or owner)
    BarberId
);
entity_id!(
    /// Customer id
    CustomerId
);
entity_id!(
    /// Bookable service offered by one barbershop
    ActivityId
);
entity_id!(
    /// Appointment id
    AppointmentId
);
entity_id!(
    /// Pending request of a barber to join a barbershop
    JoinRequestId
);
entity_id!(
    /// Showcase image attached to a barbershop
    HighlightId
);

/// A barber's daily working window in local wall-clock time.
///
/// Invariant: `start < end`. Both bounds are set together or the barber has no
/// work hours at all (`Option<WorkHours>` on the barber).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHours {
    start: NaiveTime,
    end: NaiveTime,
}

impl WorkHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, WorkHoursError> {
        if start >= end {
            return Err(WorkHoursError::StartNotBeforeEnd);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether `range`, seen on the wall clock at `offset`, lies inside the
    /// window on a single day.
    pub fn contains(&self, range: &TimeRange, offset: FixedOffset) -> bool {
        let local_start = range.start().with_timezone(&offset);
        let local_end = range.end().with_timezone(&offset);

        local_start.date_naive() == local_end.date_naive()
            && local_start.time() >= self.start
            && local_end.time() <= self.end
    }
}

/// Half-open time interval `[start, end)`.
///
/// Invariant: `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeRangeError> {
        if end <= start {
            return Err(TimeRangeError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// Interval starting at `start` and lasting `minutes`.
    pub fn starting_at(start: DateTime<Utc>, minutes: u32) -> Result<Self, TimeRangeError> {
        Self::new(start, start + Duration::minutes(i64::from(minutes)))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Half-open overlap test.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Appointment lifecycle state.
///
/// `Scheduled` is the only state that accepts transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Concluded,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Concluded => "concluded",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    /// Cancelled appointments no longer occupy their time block.
    pub fn blocks_schedule(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "concluded" => Ok(AppointmentStatus::Concluded),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(format!("Invalid appointment status: {}", s)),
        }
    }
}

/// Join request state. Approval and rejection delete the request, so only the
/// pending state is ever stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinRequestStatus {
    Pending,
}

impl JoinRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinRequestStatus::Pending => "pending",
        }
    }
}

impl std::str::FromStr for JoinRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JoinRequestStatus::Pending),
            _ => Err(format!("Invalid join request status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn test_work_hours_rejects_inverted_window() {
        assert_eq!(
            WorkHours::new(time(18, 0), time(9, 0)),
            Err(WorkHoursError::StartNotBeforeEnd)
        );
        assert_eq!(
            WorkHours::new(time(9, 0), time(9, 0)),
            Err(WorkHoursError::StartNotBeforeEnd)
        );
    }

    #[test]
    fn test_work_hours_contains_range_inside_window() {
        let hours = WorkHours::new(time(9, 0), time(18, 0)).unwrap();
        let utc_offset = FixedOffset::east_opt(0).unwrap();

        let inside = TimeRange::new(utc(9, 0), utc(9, 30)).unwrap();
        let ends_at_close = TimeRange::new(utc(17, 30), utc(18, 0)).unwrap();
        let too_early = TimeRange::new(utc(8, 45), utc(9, 15)).unwrap();
        let too_late = TimeRange::new(utc(17, 45), utc(18, 15)).unwrap();

        assert!(hours.contains(&inside, utc_offset));
        assert!(hours.contains(&ends_at_close, utc_offset));
        assert!(!hours.contains(&too_early, utc_offset));
        assert!(!hours.contains(&too_late, utc_offset));
    }

    #[test]
    fn test_work_hours_compares_in_shop_offset() {
        let hours = WorkHours::new(time(9, 0), time(18, 0)).unwrap();
        // UTC-3: 12:00Z is 09:00 local
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();

        let range = TimeRange::new(utc(12, 0), utc(12, 30)).unwrap();
        assert!(hours.contains(&range, sao_paulo));

        let before_opening = TimeRange::new(utc(11, 0), utc(11, 30)).unwrap();
        assert!(!hours.contains(&before_opening, sao_paulo));
    }

    #[test]
    fn test_time_range_requires_positive_length() {
        assert!(TimeRange::new(utc(10, 0), utc(10, 0)).is_err());
        assert!(TimeRange::new(utc(10, 0), utc(9, 0)).is_err());
        assert!(TimeRange::starting_at(utc(10, 0), 0).is_err());
    }

    #[test]
    fn test_time_range_overlap_is_half_open() {
        let a = TimeRange::new(utc(9, 30), utc(10, 0)).unwrap();
        let touching = TimeRange::new(utc(10, 0), utc(10, 30)).unwrap();
        let inner = TimeRange::new(utc(9, 40), utc(9, 50)).unwrap();
        let enclosing = TimeRange::new(utc(9, 0), utc(11, 0)).unwrap();

        assert!(!a.overlaps(&touching));
        assert!(!touching.overlaps(&a));
        assert!(a.overlaps(&inner));
        assert!(a.overlaps(&enclosing));
    }

    #[test]
    fn test_appointment_status_round_trips_through_str() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Concluded,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
        assert!("done".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_only_cancelled_frees_the_block() {
        assert!(AppointmentStatus::Scheduled.blocks_schedule());
        assert!(AppointmentStatus::Concluded.blocks_schedule());
        assert!(!AppointmentStatus::Cancelled.blocks_schedule());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(BarberId::new(), BarberId::new());
        let uuid = Uuid::new_v4();
        assert_eq!(AppointmentId::from_uuid(uuid).value(), uuid);
    }
}
