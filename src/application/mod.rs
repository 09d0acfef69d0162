pub mod account;
pub mod appointment;
mod dependencies;
mod errors;
mod lookup;
pub mod membership;

pub use dependencies::ServiceDependencies;
pub use errors::{ConflictReason, Resource, Result, SchedulingError};
