pub mod audit;
pub mod operator;
pub mod vehicle;

pub use audit::{AuditAction, AuditEntry, NewAuditEntry};
pub use operator::Operator;
pub use vehicle::{Vehicle, VehicleGroup, VehicleStatus, VehicleType};
