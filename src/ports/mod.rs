pub mod activity_repository;
pub mod appointment_repository;
pub mod barber_repository;
pub mod barbershop_repository;
pub mod customer_repository;
pub mod deletion_listener;
pub mod highlight_repository;
pub mod join_request_repository;
pub mod password_verifier;
pub mod store;

pub use activity_repository::*;
pub use appointment_repository::*;
pub use barber_repository::*;
pub use barbershop_repository::*;
pub use customer_repository::*;
pub use deletion_listener::*;
pub use highlight_repository::*;
pub use join_request_repository::*;
pub use password_verifier::*;
pub use store::{BoxError, DuplicateKeyError, ScheduleOverlapError, Store, StoreTx};
