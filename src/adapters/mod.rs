pub mod appointment_reference_guard;
pub mod bcrypt_verifier;
pub mod memory;
pub mod postgres;

pub use appointment_reference_guard::AppointmentReferenceGuard;
pub use bcrypt_verifier::BcryptPasswordVerifier;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
