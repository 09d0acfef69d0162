pub mod account_repository;
pub mod activity_repository;
pub mod appointment_repository;
pub mod barbershop_repository;
pub mod membership_repository;
pub mod store;

pub use store::{PostgresStore, PostgresTx};
