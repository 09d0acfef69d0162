use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    Activity, ActivityId, Appointment, AppointmentId, AppointmentStatus, Barber, BarberId,
    Barbershop, BarbershopId, Customer, CustomerId, Highlight, HighlightId, JoinRequest,
    JoinRequestId, TimeRange,
};
use crate::ports::store::Result;
use crate::ports::{
    ActivityRepository, AppointmentRepository, BarberRepository, BarbershopRepository,
    CustomerRepository, DuplicateKeyError, HighlightRepository, JoinRequestRepository,
    ScheduleOverlapError, Store, StoreTx,
};

#[derive(Debug, Clone, Default)]
struct State {
    barbershops: HashMap<BarbershopId, Barbershop>,
    barbers: HashMap<BarberId, Barber>,
    customers: HashMap<CustomerId, Customer>,
    activities: HashMap<ActivityId, Activity>,
    appointments: HashMap<AppointmentId, Appointment>,
    join_requests: HashMap<JoinRequestId, JoinRequest>,
    highlights: HashMap<HighlightId, Highlight>,
}

/// In-memory store
///
/// Transactions are fully serialized: `begin` holds the lock until the
/// transaction is committed or dropped, and works on a private copy of the
/// state. Commit publishes the copy; dropping discards it. A caller must
/// not open a second transaction while holding one.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration happens outside this crate; tests and embedders seed
    /// accounts directly.
    pub async fn seed_barber(&self, barber: Barber) {
        self.state
            .lock()
            .await
            .barbers
            .insert(barber.barber_id, barber);
    }

    pub async fn seed_customer(&self, customer: Customer) {
        self.state
            .lock()
            .await
            .customers
            .insert(customer.customer_id, customer);
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTx { guard, working }))
    }
}

/// Open in-memory transaction
pub struct InMemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
}

fn sorted<T>(mut items: Vec<T>, key: impl Fn(&T, &T) -> std::cmp::Ordering) -> Vec<T> {
    items.sort_by(key);
    items
}

#[async_trait]
impl StoreTx for InMemoryTx {
    fn barbershops(&mut self) -> &mut dyn BarbershopRepository {
        self
    }

    fn barbers(&mut self) -> &mut dyn BarberRepository {
        self
    }

    fn customers(&mut self) -> &mut dyn CustomerRepository {
        self
    }

    fn activities(&mut self) -> &mut dyn ActivityRepository {
        self
    }

    fn appointments(&mut self) -> &mut dyn AppointmentRepository {
        self
    }

    fn join_requests(&mut self) -> &mut dyn JoinRequestRepository {
        self
    }

    fn highlights(&mut self) -> &mut dyn HighlightRepository {
        self
    }

    // The whole store is already locked by this transaction.
    async fn lock_barber_schedule(&mut self, _barber_id: BarberId) -> Result<()> {
        Ok(())
    }

    async fn lock_customer_schedule(&mut self, _customer_id: CustomerId) -> Result<()> {
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl BarbershopRepository for InMemoryTx {
    async fn find_by_id(&mut self, barbershop_id: BarbershopId) -> Result<Option<Barbershop>> {
        Ok(self.working.barbershops.get(&barbershop_id).cloned())
    }

    async fn find_by_id_for_update(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<Option<Barbershop>> {
        BarbershopRepository::find_by_id(self, barbershop_id).await
    }

    async fn find_by_registration_number(
        &mut self,
        registration_number: &str,
    ) -> Result<Option<Barbershop>> {
        Ok(self
            .working
            .barbershops
            .values()
            .find(|shop| shop.registration_number == registration_number)
            .cloned())
    }

    async fn list(&mut self) -> Result<Vec<Barbershop>> {
        let shops = self.working.barbershops.values().cloned().collect();
        Ok(sorted(shops, |a, b| a.name.cmp(&b.name)))
    }

    async fn save(&mut self, barbershop: &Barbershop) -> Result<()> {
        let taken = self.working.barbershops.values().any(|shop| {
            shop.barbershop_id != barbershop.barbershop_id
                && shop.registration_number == barbershop.registration_number
        });
        if taken {
            return Err(Box::new(DuplicateKeyError::RegistrationNumber));
        }
        self.working
            .barbershops
            .insert(barbershop.barbershop_id, barbershop.clone());
        Ok(())
    }

    async fn delete(&mut self, barbershop_id: BarbershopId) -> Result<()> {
        self.working.barbershops.remove(&barbershop_id);
        Ok(())
    }
}

#[async_trait]
impl BarberRepository for InMemoryTx {
    async fn find_by_id(&mut self, barber_id: BarberId) -> Result<Option<Barber>> {
        Ok(self.working.barbers.get(&barber_id).cloned())
    }

    async fn find_by_email(&mut self, email: &str) -> Result<Option<Barber>> {
        Ok(self
            .working
            .barbers
            .values()
            .find(|barber| barber.email == email)
            .cloned())
    }

    async fn find_by_id_for_update(&mut self, barber_id: BarberId) -> Result<Option<Barber>> {
        BarberRepository::find_by_id(self, barber_id).await
    }

    async fn find_by_email_for_update(&mut self, email: &str) -> Result<Option<Barber>> {
        BarberRepository::find_by_email(self, email).await
    }

    async fn list_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<Vec<Barber>> {
        let barbers = self
            .working
            .barbers
            .values()
            .filter(|barber| barber.is_member_of(barbershop_id))
            .cloned()
            .collect();
        Ok(sorted(barbers, |a, b| a.name.cmp(&b.name)))
    }

    async fn save(&mut self, barber: &Barber) -> Result<()> {
        self.working.barbers.insert(barber.barber_id, barber.clone());
        Ok(())
    }

    async fn delete(&mut self, barber_id: BarberId) -> Result<()> {
        self.working.barbers.remove(&barber_id);
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryTx {
    async fn find_by_id(&mut self, customer_id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.working.customers.get(&customer_id).cloned())
    }

    async fn find_by_email(&mut self, email: &str) -> Result<Option<Customer>> {
        Ok(self
            .working
            .customers
            .values()
            .find(|customer| customer.email == email)
            .cloned())
    }

    async fn save(&mut self, customer: &Customer) -> Result<()> {
        self.working
            .customers
            .insert(customer.customer_id, customer.clone());
        Ok(())
    }

    async fn delete(&mut self, customer_id: CustomerId) -> Result<()> {
        self.working.customers.remove(&customer_id);
        Ok(())
    }
}

#[async_trait]
impl ActivityRepository for InMemoryTx {
    async fn find_by_id(&mut self, activity_id: ActivityId) -> Result<Option<Activity>> {
        Ok(self.working.activities.get(&activity_id).cloned())
    }

    async fn find_by_ids(&mut self, activity_ids: &[ActivityId]) -> Result<Vec<Activity>> {
        let activities = activity_ids
            .iter()
            .filter_map(|id| self.working.activities.get(id).cloned())
            .collect();
        Ok(sorted(activities, |a, b| a.name.cmp(&b.name)))
    }

    async fn list_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<Vec<Activity>> {
        let activities = self
            .working
            .activities
            .values()
            .filter(|activity| activity.barbershop_id == barbershop_id)
            .cloned()
            .collect();
        Ok(sorted(activities, |a, b| a.name.cmp(&b.name)))
    }

    async fn save(&mut self, activity: &Activity) -> Result<()> {
        self.working
            .activities
            .insert(activity.activity_id, activity.clone());
        Ok(())
    }

    async fn delete(&mut self, activity_id: ActivityId) -> Result<()> {
        self.working.activities.remove(&activity_id);
        Ok(())
    }

    async fn delete_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<()> {
        self.working
            .activities
            .retain(|_, activity| activity.barbershop_id != barbershop_id);
        Ok(())
    }
}

impl InMemoryTx {
    fn appointments_where(&self, keep: impl Fn(&Appointment) -> bool) -> Vec<Appointment> {
        let appointments = self
            .working
            .appointments
            .values()
            .filter(|appointment| keep(appointment))
            .cloned()
            .collect();
        sorted(appointments, |a, b| a.start_time().cmp(&b.start_time()))
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryTx {
    async fn find_by_id(&mut self, appointment_id: AppointmentId) -> Result<Option<Appointment>> {
        Ok(self.working.appointments.get(&appointment_id).cloned())
    }

    async fn find_by_id_for_update(
        &mut self,
        appointment_id: AppointmentId,
    ) -> Result<Option<Appointment>> {
        AppointmentRepository::find_by_id(self, appointment_id).await
    }

    /// Rejects a blocking appointment that overlaps another blocking
    /// appointment of the same barber.
    async fn save(&mut self, appointment: &Appointment) -> Result<()> {
        if appointment.status.blocks_schedule() {
            let collides = self.working.appointments.values().any(|other| {
                other.appointment_id != appointment.appointment_id
                    && other.barber_id == appointment.barber_id
                    && other.status.blocks_schedule()
                    && other.time.overlaps(&appointment.time)
            });
            if collides {
                return Err(Box::new(ScheduleOverlapError));
            }
        }
        self.working
            .appointments
            .insert(appointment.appointment_id, appointment.clone());
        Ok(())
    }

    async fn delete(&mut self, appointment_id: AppointmentId) -> Result<()> {
        self.working.appointments.remove(&appointment_id);
        Ok(())
    }

    async fn overlapping_for_barber(
        &mut self,
        barber_id: BarberId,
        range: &TimeRange,
    ) -> Result<Vec<Appointment>> {
        Ok(self.appointments_where(|a| a.barber_id == barber_id && a.time.overlaps(range)))
    }

    async fn overlapping_for_customer(
        &mut self,
        customer_id: CustomerId,
        range: &TimeRange,
    ) -> Result<Vec<Appointment>> {
        Ok(self.appointments_where(|a| a.customer_id == customer_id && a.time.overlaps(range)))
    }

    async fn list_for_customer(&mut self, customer_id: CustomerId) -> Result<Vec<Appointment>> {
        Ok(self.appointments_where(|a| a.customer_id == customer_id))
    }

    async fn list_for_barber(&mut self, barber_id: BarberId) -> Result<Vec<Appointment>> {
        Ok(self.appointments_where(|a| a.barber_id == barber_id))
    }

    async fn list_for_barbershop(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<Vec<Appointment>> {
        Ok(self.appointments_where(|a| a.barbershop_id == barbershop_id))
    }

    async fn exists_scheduled_for_barbershop(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<bool> {
        Ok(self.working.appointments.values().any(|a| {
            a.barbershop_id == barbershop_id && a.status == AppointmentStatus::Scheduled
        }))
    }

    async fn exists_scheduled_for_activity(&mut self, activity_id: ActivityId) -> Result<bool> {
        Ok(self.working.appointments.values().any(|a| {
            a.activity_ids.contains(&activity_id) && a.status == AppointmentStatus::Scheduled
        }))
    }

    async fn any_for_barber(&mut self, barber_id: BarberId) -> Result<bool> {
        Ok(self
            .working
            .appointments
            .values()
            .any(|a| a.barber_id == barber_id))
    }

    async fn any_for_customer(&mut self, customer_id: CustomerId) -> Result<bool> {
        Ok(self
            .working
            .appointments
            .values()
            .any(|a| a.customer_id == customer_id))
    }
}

#[async_trait]
impl JoinRequestRepository for InMemoryTx {
    async fn find_by_id(&mut self, join_request_id: JoinRequestId) -> Result<Option<JoinRequest>> {
        Ok(self.working.join_requests.get(&join_request_id).cloned())
    }

    async fn find_pending(
        &mut self,
        barber_id: BarberId,
        barbershop_id: BarbershopId,
    ) -> Result<Option<JoinRequest>> {
        Ok(self
            .working
            .join_requests
            .values()
            .find(|r| r.barber_id == barber_id && r.barbershop_id == barbershop_id)
            .cloned())
    }

    async fn list_pending_for_barbershop(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<Vec<JoinRequest>> {
        let requests = self
            .working
            .join_requests
            .values()
            .filter(|r| r.barbershop_id == barbershop_id)
            .cloned()
            .collect();
        Ok(sorted(requests, |a, b| a.created_at.cmp(&b.created_at)))
    }

    async fn list_for_barber(&mut self, barber_id: BarberId) -> Result<Vec<JoinRequest>> {
        let requests = self
            .working
            .join_requests
            .values()
            .filter(|r| r.barber_id == barber_id)
            .cloned()
            .collect();
        Ok(sorted(requests, |a, b| a.created_at.cmp(&b.created_at)))
    }

    async fn save(&mut self, request: &JoinRequest) -> Result<()> {
        let duplicate = self.working.join_requests.values().any(|r| {
            r.join_request_id != request.join_request_id
                && r.barber_id == request.barber_id
                && r.barbershop_id == request.barbershop_id
        });
        if duplicate {
            return Err(Box::new(DuplicateKeyError::PendingJoinRequest));
        }
        self.working
            .join_requests
            .insert(request.join_request_id, request.clone());
        Ok(())
    }

    async fn delete(&mut self, join_request_id: JoinRequestId) -> Result<()> {
        self.working.join_requests.remove(&join_request_id);
        Ok(())
    }

    async fn delete_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<()> {
        self.working
            .join_requests
            .retain(|_, r| r.barbershop_id != barbershop_id);
        Ok(())
    }

    async fn delete_by_barber(&mut self, barber_id: BarberId) -> Result<()> {
        self.working
            .join_requests
            .retain(|_, r| r.barber_id != barber_id);
        Ok(())
    }
}

#[async_trait]
impl HighlightRepository for InMemoryTx {
    async fn find_by_id(&mut self, highlight_id: HighlightId) -> Result<Option<Highlight>> {
        Ok(self.working.highlights.get(&highlight_id).cloned())
    }

    async fn list_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<Vec<Highlight>> {
        let highlights = self
            .working
            .highlights
            .values()
            .filter(|h| h.barbershop_id == barbershop_id)
            .cloned()
            .collect();
        Ok(sorted(highlights, |a, b| a.created_at.cmp(&b.created_at)))
    }

    async fn save(&mut self, highlight: &Highlight) -> Result<()> {
        self.working
            .highlights
            .insert(highlight.highlight_id, highlight.clone());
        Ok(())
    }

    async fn delete(&mut self, highlight_id: HighlightId) -> Result<()> {
        self.working.highlights.remove(&highlight_id);
        Ok(())
    }

    async fn delete_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<()> {
        self.working
            .highlights
            .retain(|_, h| h.barbershop_id != barbershop_id);
        Ok(())
    }
}
