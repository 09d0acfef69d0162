pub mod store;

pub use store::{InMemoryStore, InMemoryTx};
