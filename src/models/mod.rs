//! Data models for the equipment status server

pub mod equipment;
pub mod query;
pub mod statistics;

// Re-export commonly used types
pub use equipment::{
    CreateEquipment, Equipment, EquipmentDocument, EquipmentStatus, MaintenanceEntry,
    UpdateEquipmentStatus,
};
pub use query::{EquipmentFilter, EquipmentStatusQuery};
pub use statistics::EquipmentStatistics;
