mod appointment_service;
mod availability_service;
mod conflict_service;

pub use appointment_service::{
    appointments_for_barber, appointments_for_barbershop, appointments_for_customer,
    book_appointment, cancel_appointment, conclude_appointment, delete_appointment,
    get_appointment, reschedule_appointment,
};
pub use availability_service::{available_slots, monthly_availability};
pub use conflict_service::{has_conflict, has_customer_conflict};
