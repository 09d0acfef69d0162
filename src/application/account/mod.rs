mod account_service;

pub use account_service::{delete_barber, delete_customer};
