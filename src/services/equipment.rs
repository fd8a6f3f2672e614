//! Equipment service: provider selection and fallback
//!
//! Reads prefer the document store. When it is disconnected the sample
//! catalog answers directly; when a connected store fails, the same filters
//! are retried against the catalog and the failure is only logged.

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        CreateEquipment, Equipment, EquipmentDocument, EquipmentFilter, EquipmentStatistics,
        EquipmentStatus, EquipmentStatusQuery, MaintenanceEntry,
    },
    repository::{DataSource, EquipmentProvider, Repository},
};

/// Outcome of a read, recording which path served it
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Answered by `source` without any failure
    Served {
        records: Vec<Equipment>,
        source: DataSource,
    },
    /// The document store failed and the sample catalog answered instead
    Degraded {
        records: Vec<Equipment>,
        cause: String,
    },
}

impl QueryOutcome {
    pub fn source(&self) -> DataSource {
        match self {
            QueryOutcome::Served { source, .. } => *source,
            QueryOutcome::Degraded { .. } => DataSource::Sample,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, QueryOutcome::Degraded { .. })
    }

    pub fn records(&self) -> &[Equipment] {
        match self {
            QueryOutcome::Served { records, .. } | QueryOutcome::Degraded { records, .. } => records,
        }
    }

    pub fn into_records(self) -> Vec<Equipment> {
        match self {
            QueryOutcome::Served { records, .. } | QueryOutcome::Degraded { records, .. } => records,
        }
    }
}

/// Filtered, limited records with their statistics
#[derive(Debug, Clone)]
pub struct EquipmentStatusReport {
    pub records: Vec<Equipment>,
    pub statistics: EquipmentStatistics,
    pub filters: EquipmentFilter,
    pub source: DataSource,
    pub degraded: bool,
}

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn store_connected(&self) -> bool {
        self.repository.store.is_connected()
    }

    /// Run a filtered read against the preferred provider, falling back on failure
    pub async fn lookup(&self, filter: &EquipmentFilter) -> QueryOutcome {
        let catalog = self.repository.catalog.as_ref();

        if !self.repository.store.is_connected() {
            tracing::debug!("Document store disconnected, querying sample catalog");
            return QueryOutcome::Served {
                records: catalog.filter(filter),
                source: DataSource::Sample,
            };
        }

        match self.repository.store.query(filter).await {
            Ok(records) => QueryOutcome::Served {
                records,
                source: DataSource::Cosmos,
            },
            Err(e) => {
                tracing::warn!("Document store query failed, using sample data: {}", e);
                QueryOutcome::Degraded {
                    records: catalog.filter(filter),
                    cause: e.to_string(),
                }
            }
        }
    }

    /// Equipment status listing with statistics over the returned records
    pub async fn status_report(&self, query: &EquipmentStatusQuery) -> AppResult<EquipmentStatusReport> {
        let filters = query.filter()?;
        tracing::info!(
            "Equipment status requested - status: {:?}, equipmentType: {:?}, location: {:?}, limit: {:?}",
            filters.status,
            filters.equipment_type,
            filters.location,
            query.limit
        );

        let outcome = self.lookup(&filters).await;
        let source = outcome.source();
        let degraded = outcome.is_degraded();

        let mut records = outcome.into_records();
        if let Some(limit) = query.limit() {
            records.truncate(limit);
        }

        let statistics = self.repository.provider(source).statistics(&records);
        tracing::info!("Returning {} equipment from {:?}", records.len(), source);

        Ok(EquipmentStatusReport {
            records,
            statistics,
            filters,
            source,
            degraded,
        })
    }

    /// Equipment under maintenance or past its maintenance cycle
    pub async fn maintenance_due(&self) -> (Vec<MaintenanceEntry>, QueryOutcome) {
        let outcome = self.lookup(&EquipmentFilter::default()).await;
        let entries = outcome
            .records()
            .iter()
            .filter(|e| e.is_maintenance_required())
            .cloned()
            .map(MaintenanceEntry::from)
            .collect();
        (entries, outcome)
    }

    pub fn equipment_types(&self) -> Vec<String> {
        self.repository.catalog.equipment_types()
    }

    pub fn locations(&self) -> Vec<String> {
        self.repository.catalog.locations()
    }

    pub async fn create(&self, data: CreateEquipment) -> AppResult<EquipmentDocument> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let status = parse_status(&data.status)?;

        let mut equipment = Equipment::from(data);
        equipment.status = status;
        self.repository.store.create_equipment(equipment).await
    }

    pub async fn update_status(&self, equipment_id: i64, status: &str) -> AppResult<EquipmentDocument> {
        let status = parse_status(status)?;
        self.repository.store.update_status(equipment_id, status).await
    }
}

fn parse_status(value: &str) -> AppResult<EquipmentStatus> {
    EquipmentStatus::parse_known(value).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid status '{}': expected Active, Maintenance or Inactive",
            value
        ))
    })
}
