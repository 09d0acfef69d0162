/// Work hours whose start is not before their end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkHoursError {
    StartNotBeforeEnd,
}

/// Interval whose end is not after its start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRangeError {
    EndNotAfterStart,
}

/// Reasons a booking request cannot be turned into a time block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// No activity selected
    NoActivities,
    /// The barber is not currently a member of the requested barbershop
    BarberNotMember,
    /// An activity is offered by another barbershop
    ActivityNotInBarbershop,
    /// The barber is not assigned the activity
    ActivityNotAssigned,
    /// The barber has no work hours configured
    WorkHoursNotConfigured,
    /// The block does not fit inside the barber's work hours
    OutsideWorkHours,
    /// The summed duration does not produce a valid interval
    InvalidDuration,
}

impl From<TimeRangeError> for BookingError {
    fn from(err: TimeRangeError) -> Self {
        match err {
            TimeRangeError::EndNotAfterStart => BookingError::InvalidDuration,
        }
    }
}

/// Illegal appointment state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Concluded and cancelled appointments accept no further change
    NotScheduled,
}

/// Membership workflow violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// The barber already belongs to a barbershop
    AlreadyMember,
    /// The barber belongs to no barbershop
    NotMember,
    /// A pending request for this barber and barbershop already exists
    JoinRequestAlreadyPending,
    /// The requester does not own the barbershop in question
    NotBarbershopOwner,
    /// Owners close their barbershop instead of leaving it
    OwnerCannotLeave,
    /// The owner tried to remove themself
    OwnerCannotRemoveSelf,
    /// The target barber is not staff of this barbershop
    BarberNotInBarbershop,
    /// The activity or highlight belongs to another barbershop
    ForeignResource,
}
