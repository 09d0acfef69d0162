use async_trait::async_trait;

use super::store::Result;
use crate::domain::{
    ActivityId, Appointment, AppointmentId, BarberId, BarbershopId, CustomerId, TimeRange,
};

/// Appointment persistence.
///
/// Every listing is ordered by start time.
#[async_trait]
pub trait AppointmentRepository: Send {
    async fn find_by_id(&mut self, appointment_id: AppointmentId) -> Result<Option<Appointment>>;

    /// `find_by_id`, holding the appointment row until the transaction ends.
    async fn find_by_id_for_update(
        &mut self,
        appointment_id: AppointmentId,
    ) -> Result<Option<Appointment>>;

    /// Insert or replace.
    ///
    /// A store that enforces non-overlap itself fails with
    /// `ScheduleOverlapError`.
    async fn save(&mut self, appointment: &Appointment) -> Result<()>;

    async fn delete(&mut self, appointment_id: AppointmentId) -> Result<()>;

    /// Appointments of the barber, in any status, whose block overlaps `range`.
    async fn overlapping_for_barber(
        &mut self,
        barber_id: BarberId,
        range: &TimeRange,
    ) -> Result<Vec<Appointment>>;

    /// Appointments of the customer, in any status, whose block overlaps `range`.
    async fn overlapping_for_customer(
        &mut self,
        customer_id: CustomerId,
        range: &TimeRange,
    ) -> Result<Vec<Appointment>>;

    async fn list_for_customer(&mut self, customer_id: CustomerId) -> Result<Vec<Appointment>>;

    async fn list_for_barber(&mut self, barber_id: BarberId) -> Result<Vec<Appointment>>;

    async fn list_for_barbershop(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<Vec<Appointment>>;

    async fn exists_scheduled_for_barbershop(&mut self, barbershop_id: BarbershopId)
    -> Result<bool>;

    async fn exists_scheduled_for_activity(&mut self, activity_id: ActivityId) -> Result<bool>;

    /// Whether any appointment, in any status, references the barber.
    async fn any_for_barber(&mut self, barber_id: BarberId) -> Result<bool>;

    /// Whether any appointment, in any status, references the customer.
    async fn any_for_customer(&mut self, customer_id: CustomerId) -> Result<bool>;
}
