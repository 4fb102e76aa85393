pub mod aggregator;
pub mod audit_ledger;
pub mod entity_store;
pub mod presence;
pub mod seed;
pub mod sync_hub;

pub use audit_ledger::AuditLedger;
pub use entity_store::EntityStore;
pub use presence::PresenceTracker;
pub use sync_hub::{HubCommand, HubHandle, SyncHub};
