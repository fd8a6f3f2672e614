//! Repository layer: the providers equipment records are read from

pub mod catalog;
pub mod cosmos;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{Equipment, EquipmentFilter, EquipmentStatistics},
};

pub use catalog::StaticCatalog;
pub use cosmos::DocumentStore;

/// Which provider answered a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// The Cosmos DB container
    Cosmos,
    /// The in-memory sample catalog
    Sample,
}

/// Query and aggregation contract shared by every data source
#[async_trait]
pub trait EquipmentProvider: Send + Sync {
    fn source(&self) -> DataSource;

    /// Records matching every present filter, in source order
    async fn query(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>>;

    fn statistics(&self, records: &[Equipment]) -> EquipmentStatistics {
        EquipmentStatistics::from_records(records)
    }
}

/// Main repository struct holding both providers
#[derive(Clone)]
pub struct Repository {
    pub catalog: Arc<StaticCatalog>,
    pub store: Arc<DocumentStore>,
}

impl Repository {
    /// Create a new repository from a catalog and a document store
    pub fn new(catalog: StaticCatalog, store: DocumentStore) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store: Arc::new(store),
        }
    }

    pub fn provider(&self, source: DataSource) -> &dyn EquipmentProvider {
        match source {
            DataSource::Cosmos => self.store.as_ref(),
            DataSource::Sample => self.catalog.as_ref(),
        }
    }
}
