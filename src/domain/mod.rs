pub mod appointment;
pub mod availability;
pub mod barber;
pub mod barbershop;
pub mod commands;
pub mod conflict;
pub mod errors;
pub mod events;
pub mod membership;
pub mod value_objects;

pub use appointment::{Appointment, BookingPlan};
pub use availability::DailyAvailability;
pub use barber::{AccountData, Barber, Customer};
pub use barbershop::{Activity, Barbershop, Highlight};
pub use commands::*;
pub use errors::*;
pub use events::*;
pub use membership::JoinRequest;
pub use value_objects::*;
