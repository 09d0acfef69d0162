use async_trait::async_trait;

use super::{
    ActivityRepository, AppointmentRepository, BarberRepository, BarbershopRepository,
    CustomerRepository, HighlightRepository, JoinRequestRepository,
};
use crate::domain::{BarberId, CustomerId};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, BoxError>;

/// Entry point to persistence: opens a unit of work.
#[async_trait]
pub trait Store: Send + Sync {
    /// Start a transaction. Every read and write of one operation goes
    /// through the returned handle.
    async fn begin(&self) -> Result<Box<dyn StoreTx>>;
}

/// One open transaction.
///
/// Dropping the handle without `commit` discards every write made through it.
#[async_trait]
pub trait StoreTx: Send {
    fn barbershops(&mut self) -> &mut dyn BarbershopRepository;

    fn barbers(&mut self) -> &mut dyn BarberRepository;

    fn customers(&mut self) -> &mut dyn CustomerRepository;

    fn activities(&mut self) -> &mut dyn ActivityRepository;

    fn appointments(&mut self) -> &mut dyn AppointmentRepository;

    fn join_requests(&mut self) -> &mut dyn JoinRequestRepository;

    fn highlights(&mut self) -> &mut dyn HighlightRepository;

    /// Serialize bookings of one barber until this transaction ends.
    async fn lock_barber_schedule(&mut self, barber_id: BarberId) -> Result<()>;

    /// Serialize bookings of one customer until this transaction ends.
    async fn lock_customer_schedule(&mut self, customer_id: CustomerId) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Raised by a store that rejected an appointment write because it overlaps
/// another non-cancelled appointment of the same barber.
#[derive(Debug, thiserror::Error)]
#[error("appointment overlaps another appointment of the barber")]
pub struct ScheduleOverlapError;

/// Raised by a store that rejected a write because it repeats a key that
/// must stay unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DuplicateKeyError {
    #[error("registration number is already taken")]
    RegistrationNumber,

    #[error("a pending join request for this barber and barbershop already exists")]
    PendingJoinRequest,
}
