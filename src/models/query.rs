//! Query parameters and the filter set applied to providers

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::equipment::{Equipment, EquipmentStatus};
use crate::error::{AppError, AppResult};

/// Raw query-string parameters of `GET /equipment-status`
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EquipmentStatusQuery {
    /// Active, Maintenance or Inactive
    pub status: Option<String>,
    /// Motor, Robot, Compressor, ...
    pub equipment_type: Option<String>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    /// Maximum number of records; ignored when not a number
    pub limit: Option<String>,
}

/// Filters applied conjunctively by every provider.
///
/// Serialized as the `filters_applied` echo of the response.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EquipmentStatusQuery {
    /// Build the filter set, dropping empty values.
    ///
    /// A status outside the known set is rejected.
    pub fn filter(&self) -> AppResult<EquipmentFilter> {
        let status = non_empty(&self.status);
        if let Some(ref status) = status {
            if EquipmentStatus::parse_known(status).is_none() {
                return Err(AppError::Validation(format!(
                    "Invalid status '{}': expected Active, Maintenance or Inactive",
                    status
                )));
            }
        }

        Ok(EquipmentFilter {
            status,
            equipment_type: non_empty(&self.equipment_type),
            location: non_empty(&self.location),
        })
    }

    /// Parsed `limit`; a non-numeric value is logged and ignored
    pub fn limit(&self) -> Option<usize> {
        let raw = self.limit.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        match raw.parse::<usize>() {
            Ok(limit) => Some(limit),
            Err(_) => {
                tracing::warn!("Ignoring invalid limit parameter: {}", raw);
                None
            }
        }
    }
}

impl EquipmentFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.equipment_type.is_none() && self.location.is_none()
    }

    /// Whether a record satisfies every present filter
    pub fn matches(&self, equipment: &Equipment) -> bool {
        self.matches_status(equipment)
            && self.matches_type(equipment)
            && self.matches_location(equipment)
    }

    pub fn matches_status(&self, equipment: &Equipment) -> bool {
        self.status
            .as_deref()
            .map_or(true, |status| equipment.status.as_str() == status)
    }

    pub fn matches_type(&self, equipment: &Equipment) -> bool {
        self.equipment_type
            .as_deref()
            .map_or(true, |equipment_type| equipment.equipment_type == equipment_type)
    }

    pub fn matches_location(&self, equipment: &Equipment) -> bool {
        self.location.as_deref().map_or(true, |location| {
            equipment
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}
