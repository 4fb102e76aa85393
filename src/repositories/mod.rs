pub mod fleet_repository;
pub mod memory_repository;

pub use fleet_repository::{FleetRepository, PgFleetRepository};
pub use memory_repository::MemoryFleetRepository;
