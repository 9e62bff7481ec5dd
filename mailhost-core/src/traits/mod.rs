//! Storage layer abstraction trait definition

mod domain_repository;
mod order_repository;

pub use domain_repository::DomainRepository;
pub use order_repository::OrderRepository;
