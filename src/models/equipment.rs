//! Equipment model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Document type tag shared by every equipment document in the container
pub const DOCUMENT_TYPE: &str = "equipment";

/// Partition key used when a record has no equipment type
pub const UNKNOWN_PARTITION: &str = "unknown";

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

/// Operating status.
///
/// The store may hold values outside the three known ones; they are kept
/// verbatim in `Other` so that reads never fail on unexpected data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EquipmentStatus {
    Active,
    Maintenance,
    Inactive,
    Other(String),
    #[default]
    Unset,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EquipmentStatus::Active => "Active",
            EquipmentStatus::Maintenance => "Maintenance",
            EquipmentStatus::Inactive => "Inactive",
            EquipmentStatus::Other(s) => s,
            EquipmentStatus::Unset => "",
        }
    }

    /// Parse one of the three known statuses, rejecting anything else
    pub fn parse_known(value: &str) -> Option<Self> {
        match Self::from(value.to_string()) {
            EquipmentStatus::Other(_) | EquipmentStatus::Unset => None,
            status => Some(status),
        }
    }

    /// Japanese display label, falling back to the raw value
    pub fn label_ja(&self) -> &str {
        match self {
            EquipmentStatus::Active => "稼働中",
            EquipmentStatus::Maintenance => "メンテナンス中",
            EquipmentStatus::Inactive => "停止中",
            other => other.as_str(),
        }
    }
}

impl From<String> for EquipmentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Active" => EquipmentStatus::Active,
            "Maintenance" => EquipmentStatus::Maintenance,
            "Inactive" => EquipmentStatus::Inactive,
            "" => EquipmentStatus::Unset,
            _ => EquipmentStatus::Other(s),
        }
    }
}

impl From<EquipmentStatus> for String {
    fn from(status: EquipmentStatus) -> Self {
        match status {
            EquipmentStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// Equipment record in its wire form.
///
/// Absent or `null` fields default to zero values instead of failing
/// deserialization, and whole-number fields also accept floats.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Equipment {
    #[serde(deserialize_with = "lenient::integer")]
    pub equipment_id: i64,
    #[serde(deserialize_with = "lenient::string")]
    pub equipment_name: String,
    /// Motor, Robot, Compressor, Inspection, Packaging, Press, CNC, Conveyor, ...
    #[serde(deserialize_with = "lenient::string")]
    pub equipment_type: String,
    #[serde(deserialize_with = "lenient::string")]
    pub serial_number: String,
    #[serde(deserialize_with = "lenient::string")]
    pub manufacturer: String,
    #[serde(deserialize_with = "lenient::string")]
    pub model: String,
    #[serde(deserialize_with = "lenient::string")]
    pub location: String,
    /// ISO date (YYYY-MM-DD)
    #[serde(deserialize_with = "lenient::string")]
    pub installation_date: String,
    /// Operating hours after which maintenance is due
    #[serde(deserialize_with = "lenient::integer")]
    pub maintenance_cycle_hours: i64,
    #[serde(deserialize_with = "lenient::string")]
    pub responsible_person: String,
    #[serde(deserialize_with = "lenient::status")]
    #[schema(value_type = String, example = "Active")]
    pub status: EquipmentStatus,
    pub current_temperature: Option<f64>,
    pub current_vibration: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_integer")]
    pub operating_hours: Option<i64>,
    /// Percentage (0-100), meaningful only while active
    pub efficiency: Option<f64>,
    pub last_maintenance_date: Option<String>,
    pub next_maintenance_date: Option<String>,
}

impl Equipment {
    pub fn is_active(&self) -> bool {
        self.status == EquipmentStatus::Active
    }

    /// Under maintenance, or operating hours have reached the maintenance cycle
    pub fn is_maintenance_required(&self) -> bool {
        if self.status == EquipmentStatus::Maintenance {
            return true;
        }
        match self.operating_hours {
            Some(hours) if hours > 0 && self.maintenance_cycle_hours > 0 => {
                hours >= self.maintenance_cycle_hours
            }
            _ => false,
        }
    }

    pub fn status_label(&self) -> &str {
        self.status.label_ja()
    }

    /// Synthetic document id in the store
    pub fn document_id(equipment_id: i64) -> String {
        format!("equipment_{}", equipment_id)
    }

    pub fn partition_key(&self) -> &str {
        if self.equipment_type.is_empty() {
            UNKNOWN_PARTITION
        } else {
            &self.equipment_type
        }
    }
}

/// Deserializers that map `null` to the zero value and round fractional numbers
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Number;

    use super::EquipmentStatus;

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EquipmentStatus, D::Error> {
        string(deserializer).map(EquipmentStatus::from)
    }

    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(optional_integer(deserializer)?.unwrap_or_default())
    }

    pub fn optional_integer<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        let number = Option::<Number>::deserialize(deserializer)?;
        Ok(number.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))))
    }
}

// ---------------------------------------------------------------------------
// EquipmentDocument
// ---------------------------------------------------------------------------

/// Equipment record as stored in the document container.
///
/// System properties added by the store (`_rid`, `_etag`, `_ts`, ...) are
/// kept in `extra` so that an upsert writes them back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDocument {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub document_type: String,
    #[serde(default)]
    pub partition_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub equipment: Equipment,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EquipmentDocument {
    /// Wrap a record with its synthetic id, document tag and partition key
    pub fn new(equipment: Equipment) -> Self {
        Self {
            id: Equipment::document_id(equipment.equipment_id),
            document_type: DOCUMENT_TYPE.to_string(),
            partition_key: Some(equipment.partition_key().to_string()),
            last_updated: None,
            equipment,
            extra: serde_json::Map::new(),
        }
    }

    /// Partition the document lives in: stored key, else equipment type, else `unknown`
    pub fn partition(&self) -> &str {
        match self.partition_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => self.equipment.partition_key(),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Create equipment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[validate(range(min = 1, message = "equipmentId must be positive"))]
    pub equipment_id: i64,
    #[validate(length(min = 1, message = "equipmentName is required"))]
    pub equipment_name: String,
    #[validate(length(min = 1, message = "equipmentType is required"))]
    pub equipment_type: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub installation_date: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "maintenanceCycleHours must not be negative"))]
    pub maintenance_cycle_hours: i64,
    #[serde(default)]
    pub responsible_person: String,
    /// Active, Maintenance or Inactive
    pub status: String,
    pub current_temperature: Option<f64>,
    pub current_vibration: Option<f64>,
    #[validate(range(min = 0, message = "operatingHours must not be negative"))]
    pub operating_hours: Option<i64>,
    #[validate(range(min = 0.0, max = 100.0, message = "efficiency must be between 0 and 100"))]
    pub efficiency: Option<f64>,
    pub last_maintenance_date: Option<String>,
    pub next_maintenance_date: Option<String>,
}

impl From<CreateEquipment> for Equipment {
    fn from(data: CreateEquipment) -> Self {
        Self {
            equipment_id: data.equipment_id,
            equipment_name: data.equipment_name,
            equipment_type: data.equipment_type,
            serial_number: data.serial_number,
            manufacturer: data.manufacturer,
            model: data.model,
            location: data.location,
            installation_date: data.installation_date,
            maintenance_cycle_hours: data.maintenance_cycle_hours,
            responsible_person: data.responsible_person,
            status: EquipmentStatus::from(data.status),
            current_temperature: data.current_temperature,
            current_vibration: data.current_vibration,
            operating_hours: data.operating_hours,
            efficiency: data.efficiency,
            last_maintenance_date: data.last_maintenance_date,
            next_maintenance_date: data.next_maintenance_date,
        }
    }
}

/// Update equipment status request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateEquipmentStatus {
    /// Active, Maintenance or Inactive
    pub status: String,
}

/// Equipment with its derived maintenance facts
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceEntry {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub status_label: String,
    pub is_maintenance_required: bool,
}

impl From<Equipment> for MaintenanceEntry {
    fn from(equipment: Equipment) -> Self {
        Self {
            status_label: equipment.status_label().to_string(),
            is_maintenance_required: equipment.is_maintenance_required(),
            equipment,
        }
    }
}
