//! Storage adapters for the core repository traits.

mod memory;

pub use memory::{InMemoryDomainRepository, InMemoryOrderRepository};
