//! Aggregate statistics over a set of equipment records

use serde::Serialize;
use utoipa::ToSchema;

use super::equipment::{Equipment, EquipmentStatus};

/// Statistics summary
#[derive(Debug, Clone, PartialEq, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentStatistics {
    pub total_equipment: usize,
    pub active_equipment: usize,
    pub maintenance_equipment: usize,
    pub inactive_equipment: usize,
    /// Mean efficiency of active equipment, one decimal place
    pub average_efficiency: f64,
    pub total_operating_hours: i64,
}

impl EquipmentStatistics {
    /// Aggregate a record set. An empty set yields the zero summary.
    pub fn from_records(records: &[Equipment]) -> Self {
        let mut stats = Self {
            total_equipment: records.len(),
            ..Default::default()
        };
        let mut efficiency_sum = 0.0;

        for equipment in records {
            match equipment.status {
                EquipmentStatus::Active => {
                    stats.active_equipment += 1;
                    efficiency_sum += equipment.efficiency.unwrap_or(0.0);
                }
                EquipmentStatus::Maintenance => stats.maintenance_equipment += 1,
                EquipmentStatus::Inactive => stats.inactive_equipment += 1,
                _ => {}
            }
            stats.total_operating_hours += equipment.operating_hours.unwrap_or(0);
        }

        if stats.active_equipment > 0 {
            stats.average_efficiency =
                round_one_decimal(efficiency_sum / stats.active_equipment as f64);
        }
        stats
    }
}

/// Round half away from zero to one decimal place
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
