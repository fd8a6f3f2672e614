//! In-memory equipment catalog used when the document store is unavailable

use std::{collections::BTreeSet, path::Path};

use async_trait::async_trait;

use super::{DataSource, EquipmentProvider};
use crate::{
    error::{AppError, AppResult},
    models::{Equipment, EquipmentFilter},
};

/// Built-in sample data (eight machines across two factories)
const SAMPLE_EQUIPMENT: &str = include_str!("../../data/sample_equipment.json");

/// Immutable catalog of equipment records.
///
/// Queries always return copies; the backing records are never handed out
/// mutably, so the catalog can be shared between requests freely.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    records: Vec<Equipment>,
}

impl StaticCatalog {
    pub fn new(records: Vec<Equipment>) -> Self {
        tracing::info!("Sample catalog initialized with {} equipment", records.len());
        Self { records }
    }

    /// The built-in sample catalog
    pub fn sample() -> AppResult<Self> {
        Self::from_json(SAMPLE_EQUIPMENT)
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        let records: Vec<Equipment> = serde_json::from_str(json)
            .map_err(|e| AppError::Internal(format!("Invalid equipment catalog: {}", e)))?;
        Ok(Self::new(records))
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn records(&self) -> &[Equipment] {
        &self.records
    }

    /// Apply filters in order: status, then equipment type, then location
    pub fn filter(&self, filter: &EquipmentFilter) -> Vec<Equipment> {
        let mut records = self.records.clone();

        if let Some(ref status) = filter.status {
            records.retain(|e| filter.matches_status(e));
            tracing::debug!("Status filter applied: {} - {} results", status, records.len());
        }

        if let Some(ref equipment_type) = filter.equipment_type {
            records.retain(|e| filter.matches_type(e));
            tracing::debug!(
                "Equipment type filter applied: {} - {} results",
                equipment_type,
                records.len()
            );
        }

        if let Some(ref location) = filter.location {
            records.retain(|e| filter.matches_location(e));
            tracing::debug!("Location filter applied: {} - {} results", location, records.len());
        }

        records
    }

    /// Distinct equipment types, sorted
    pub fn equipment_types(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|e| e.equipment_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct locations, sorted
    pub fn locations(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|e| e.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[async_trait]
impl EquipmentProvider for StaticCatalog {
    fn source(&self) -> DataSource {
        DataSource::Sample
    }

    async fn query(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>> {
        Ok(self.filter(filter))
    }
}
