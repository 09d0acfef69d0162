use std::fmt;
use thiserror::Error;

use crate::domain::{
    BookingError, DeletionVeto, MembershipError, TimeRangeError, TransitionError, WorkHoursError,
};
use crate::ports::{BoxError, DuplicateKeyError, ScheduleOverlapError};

/// Entity that could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Barbershop,
    Barber,
    Customer,
    Activity,
    Appointment,
    JoinRequest,
    Highlight,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Barbershop => "barbershop",
            Resource::Barber => "barber",
            Resource::Customer => "customer",
            Resource::Activity => "activity",
            Resource::Appointment => "appointment",
            Resource::JoinRequest => "join request",
            Resource::Highlight => "highlight",
        };
        f.write_str(name)
    }
}

/// Business rule that rejected an operation.
///
/// Each reason carries a stable key for callers that translate messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    BarberNotMember,
    ActivityNotInBarbershop,
    ActivityNotAssigned,
    NoActivities,
    OutsideWorkHours,
    WorkHoursNotConfigured,
    BarberScheduleOverlap,
    CustomerScheduleOverlap,
    AppointmentNotScheduled,
    RequesterNotCustomer,
    RequesterNotBarber,
    RequesterCannotCancel,
    RequesterNotParticipant,
    RequesterNotOwner,
    AlreadyMember,
    NotMember,
    BarberNotInBarbershop,
    RegistrationNumberTaken,
    JoinRequestAlreadyPending,
    OwnerCannotLeave,
    OwnerCannotRemoveSelf,
    BarbershopHasScheduledAppointments,
    ActivityHasScheduledAppointments,
    InvalidPassword,
    InvalidWorkHours,
    InvalidActivityDuration,
    InvalidAvailabilityDuration,
    InvalidMonth,
    InvalidTimeRange,
    BarberReferenced,
    CustomerReferenced,
    OwnerMustCloseBarbershop,
    ForeignResource,
}

impl ConflictReason {
    pub fn key(&self) -> &'static str {
        match self {
            ConflictReason::BarberNotMember => "appointment.barber.not_member",
            ConflictReason::ActivityNotInBarbershop => "appointment.activity.wrong_barbershop",
            ConflictReason::ActivityNotAssigned => "appointment.activity.not_assigned",
            ConflictReason::NoActivities => "appointment.activity.empty",
            ConflictReason::OutsideWorkHours => "appointment.work_hours.outside",
            ConflictReason::WorkHoursNotConfigured => "appointment.work_hours.missing",
            ConflictReason::BarberScheduleOverlap => "appointment.schedule.overlap",
            ConflictReason::CustomerScheduleOverlap => "appointment.customer.overlap",
            ConflictReason::AppointmentNotScheduled => "appointment.status.terminal",
            ConflictReason::RequesterNotCustomer => "appointment.requester.not_customer",
            ConflictReason::RequesterNotBarber => "appointment.requester.not_barber",
            ConflictReason::RequesterCannotCancel => "appointment.requester.cannot_cancel",
            ConflictReason::RequesterNotParticipant => "appointment.requester.not_participant",
            ConflictReason::RequesterNotOwner => "barbershop.requester.not_owner",
            ConflictReason::AlreadyMember => "barber.membership.exists",
            ConflictReason::NotMember => "barber.membership.none",
            ConflictReason::BarberNotInBarbershop => "barber.membership.mismatch",
            ConflictReason::RegistrationNumberTaken => "barbershop.registration_number.taken",
            ConflictReason::JoinRequestAlreadyPending => "join_request.pending.exists",
            ConflictReason::OwnerCannotLeave => "barber.owner.cannot_leave",
            ConflictReason::OwnerCannotRemoveSelf => "barber.owner.cannot_remove_self",
            ConflictReason::BarbershopHasScheduledAppointments => {
                "barbershop.appointments.pending"
            }
            ConflictReason::ActivityHasScheduledAppointments => "activity.appointments.pending",
            ConflictReason::InvalidPassword => "barbershop.close.invalid_password",
            ConflictReason::InvalidWorkHours => "barber.work_hours.invalid",
            ConflictReason::InvalidActivityDuration => "activity.duration.invalid",
            ConflictReason::InvalidAvailabilityDuration => "availability.duration.invalid",
            ConflictReason::InvalidMonth => "availability.month.invalid",
            ConflictReason::InvalidTimeRange => "appointment.time_range.invalid",
            ConflictReason::BarberReferenced => "barber.appointments.referenced",
            ConflictReason::CustomerReferenced => "customer.appointments.referenced",
            ConflictReason::OwnerMustCloseBarbershop => "barber.owner.must_close_barbershop",
            ConflictReason::ForeignResource => "barbershop.resource.foreign",
        }
    }

    /// The requester lacks the role the operation needs.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            ConflictReason::RequesterNotCustomer
                | ConflictReason::RequesterNotBarber
                | ConflictReason::RequesterCannotCancel
                | ConflictReason::RequesterNotParticipant
                | ConflictReason::RequesterNotOwner
                | ConflictReason::InvalidPassword
        )
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Application layer error
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("{0} not found")]
    NotFound(Resource),

    /// A business rule rejected the operation; nothing was written
    #[error("Conflict: {0}")]
    ReferenceConflict(ConflictReason),

    #[error("Store error")]
    Store(#[source] BoxError),

    #[error("Password verifier error")]
    PasswordVerifier(#[source] BoxError),
}

impl SchedulingError {
    /// Wrap a store failure.
    ///
    /// An overlap or duplicate key rejected by the store itself becomes the
    /// same conflict the service-side check reports.
    pub fn store(err: BoxError) -> Self {
        if err.is::<ScheduleOverlapError>() {
            return SchedulingError::ReferenceConflict(ConflictReason::BarberScheduleOverlap);
        }
        if let Some(duplicate) = err.downcast_ref::<DuplicateKeyError>() {
            let reason = match duplicate {
                DuplicateKeyError::RegistrationNumber => ConflictReason::RegistrationNumberTaken,
                DuplicateKeyError::PendingJoinRequest => ConflictReason::JoinRequestAlreadyPending,
            };
            return SchedulingError::ReferenceConflict(reason);
        }
        tracing::error!("Store error: {}", err);
        SchedulingError::Store(err)
    }

    pub fn password_verifier(err: BoxError) -> Self {
        tracing::error!("Password verifier error: {}", err);
        SchedulingError::PasswordVerifier(err)
    }

    /// The conflict reason, when this is a business rule rejection.
    pub fn conflict_reason(&self) -> Option<ConflictReason> {
        match self {
            SchedulingError::ReferenceConflict(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<ConflictReason> for SchedulingError {
    fn from(reason: ConflictReason) -> Self {
        SchedulingError::ReferenceConflict(reason)
    }
}

impl From<BookingError> for SchedulingError {
    fn from(err: BookingError) -> Self {
        let reason = match err {
            BookingError::NoActivities => ConflictReason::NoActivities,
            BookingError::BarberNotMember => ConflictReason::BarberNotMember,
            BookingError::ActivityNotInBarbershop => ConflictReason::ActivityNotInBarbershop,
            BookingError::ActivityNotAssigned => ConflictReason::ActivityNotAssigned,
            BookingError::WorkHoursNotConfigured => ConflictReason::WorkHoursNotConfigured,
            BookingError::OutsideWorkHours => ConflictReason::OutsideWorkHours,
            BookingError::InvalidDuration => ConflictReason::InvalidActivityDuration,
        };
        reason.into()
    }
}

impl From<TransitionError> for SchedulingError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotScheduled => ConflictReason::AppointmentNotScheduled.into(),
        }
    }
}

impl From<MembershipError> for SchedulingError {
    fn from(err: MembershipError) -> Self {
        let reason = match err {
            MembershipError::AlreadyMember => ConflictReason::AlreadyMember,
            MembershipError::NotMember => ConflictReason::NotMember,
            MembershipError::JoinRequestAlreadyPending => {
                ConflictReason::JoinRequestAlreadyPending
            }
            MembershipError::NotBarbershopOwner => ConflictReason::RequesterNotOwner,
            MembershipError::OwnerCannotLeave => ConflictReason::OwnerCannotLeave,
            MembershipError::OwnerCannotRemoveSelf => ConflictReason::OwnerCannotRemoveSelf,
            MembershipError::BarberNotInBarbershop => ConflictReason::BarberNotInBarbershop,
            MembershipError::ForeignResource => ConflictReason::ForeignResource,
        };
        reason.into()
    }
}

impl From<WorkHoursError> for SchedulingError {
    fn from(err: WorkHoursError) -> Self {
        match err {
            WorkHoursError::StartNotBeforeEnd => ConflictReason::InvalidWorkHours.into(),
        }
    }
}

impl From<TimeRangeError> for SchedulingError {
    fn from(err: TimeRangeError) -> Self {
        match err {
            TimeRangeError::EndNotAfterStart => ConflictReason::InvalidTimeRange.into(),
        }
    }
}

impl From<DeletionVeto> for SchedulingError {
    fn from(veto: DeletionVeto) -> Self {
        match veto {
            DeletionVeto::BarberReferenced => ConflictReason::BarberReferenced.into(),
            DeletionVeto::CustomerReferenced => ConflictReason::CustomerReferenced.into(),
        }
    }
}

/// Application layer Result
pub type Result<T> = std::result::Result<T, SchedulingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_overlap_maps_to_schedule_conflict() {
        let err = SchedulingError::store(Box::new(ScheduleOverlapError));
        assert_eq!(
            err.conflict_reason(),
            Some(ConflictReason::BarberScheduleOverlap)
        );
    }

    #[test]
    fn test_store_duplicate_keys_map_to_business_conflicts() {
        let err = SchedulingError::store(Box::new(DuplicateKeyError::RegistrationNumber));
        assert_eq!(
            err.conflict_reason(),
            Some(ConflictReason::RegistrationNumberTaken)
        );

        let err = SchedulingError::store(Box::new(DuplicateKeyError::PendingJoinRequest));
        assert_eq!(
            err.conflict_reason(),
            Some(ConflictReason::JoinRequestAlreadyPending)
        );
    }

    #[test]
    fn test_other_store_errors_stay_infrastructure_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err = SchedulingError::store(Box::new(io));
        assert!(matches!(err, SchedulingError::Store(_)));
    }

    #[test]
    fn test_owner_check_is_an_authorization_conflict() {
        let err = SchedulingError::from(MembershipError::NotBarbershopOwner);
        let reason = err.conflict_reason().unwrap();
        assert!(reason.is_authorization());
        assert_eq!(reason.key(), "barbershop.requester.not_owner");

        assert!(!ConflictReason::OwnerCannotLeave.is_authorization());
    }
}
