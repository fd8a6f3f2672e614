//! Cosmos DB equipment provider

pub mod auth;
pub mod client;
pub mod query;

use std::sync::Arc;

use async_trait::async_trait;

use super::{DataSource, EquipmentProvider};
use crate::{
    config::CosmosConfig,
    error::{AppError, AppResult},
    models::{Equipment, EquipmentDocument, EquipmentFilter, EquipmentStatus},
    utc_timestamp,
};

pub use client::{CosmosClient, DocumentClient, StoreError};
pub use query::{QueryBuilder, SqlQuery};

/// Equipment provider backed by a document container.
///
/// Connectivity is decided once at construction: without a client the
/// store stays disconnected for the lifetime of the process.
#[derive(Clone)]
pub struct DocumentStore {
    client: Option<Arc<dyn DocumentClient>>,
}

impl DocumentStore {
    /// Connect using the configured credentials, or start disconnected
    pub fn from_config(config: &CosmosConfig) -> Self {
        if config.credentials().is_none() {
            tracing::warn!("Cosmos DB credentials are not configured; serving sample data");
            return Self::disconnected();
        }

        match CosmosClient::new(config) {
            Ok(client) => {
                tracing::info!(
                    "Connected to Cosmos DB: {}/{}",
                    config.database,
                    config.container
                );
                Self::with_client(Arc::new(client))
            }
            Err(e) => {
                tracing::error!("Failed to initialize Cosmos DB client: {}", e);
                Self::disconnected()
            }
        }
    }

    pub fn with_client(client: Arc<dyn DocumentClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn disconnected() -> Self {
        Self { client: None }
    }

    /// Local connectivity flag; no request is sent
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> AppResult<&dyn DocumentClient> {
        self.client
            .as_deref()
            .ok_or_else(|| AppError::Unavailable("Cosmos DB is not connected".to_string()))
    }

    /// Insert a new equipment document.
    ///
    /// Not idempotent: a second insert with the same equipment id is
    /// rejected by the store and surfaces as a write failure.
    pub async fn create_equipment(&self, equipment: Equipment) -> AppResult<EquipmentDocument> {
        let client = self.client()?;
        let document = EquipmentDocument::new(equipment);
        let body = serde_json::to_value(&document)
            .map_err(|e| AppError::Internal(format!("Failed to encode equipment: {}", e)))?;

        let created = client
            .create(document.partition(), &body)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create equipment {}: {}", document.id, e);
                AppError::WriteFailure(e.to_string())
            })?;

        let created: EquipmentDocument = serde_json::from_value(created)
            .map_err(|e| AppError::WriteFailure(format!("Unexpected stored document: {}", e)))?;
        tracing::info!("Created equipment document: id={}", created.id);
        Ok(created)
    }

    /// Set the status of an existing equipment and stamp `lastUpdated`.
    ///
    /// Read-modify-write without concurrency control: the last writer wins.
    pub async fn update_status(
        &self,
        equipment_id: i64,
        status: EquipmentStatus,
    ) -> AppResult<EquipmentDocument> {
        let client = self.client()?;

        let found = client
            .query(&query::document_by_id_query(equipment_id))
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up equipment {}: {}", equipment_id, e);
                AppError::WriteFailure(e.to_string())
            })?;

        let current = found
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", equipment_id)))?;
        let mut document: EquipmentDocument = serde_json::from_value(current)
            .map_err(|e| AppError::WriteFailure(format!("Unexpected stored document: {}", e)))?;

        document.equipment.status = status;
        document.last_updated = Some(utc_timestamp());

        let body = serde_json::to_value(&document)
            .map_err(|e| AppError::Internal(format!("Failed to encode equipment: {}", e)))?;
        let updated = client
            .upsert(document.partition(), &body)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update equipment {}: {}", equipment_id, e);
                AppError::WriteFailure(e.to_string())
            })?;

        let updated: EquipmentDocument = serde_json::from_value(updated)
            .map_err(|e| AppError::WriteFailure(format!("Unexpected stored document: {}", e)))?;
        tracing::info!(
            "Updated equipment status: id={}, status={}",
            equipment_id,
            updated.equipment.status
        );
        Ok(updated)
    }
}

#[async_trait]
impl EquipmentProvider for DocumentStore {
    fn source(&self) -> DataSource {
        DataSource::Cosmos
    }

    async fn query(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>> {
        let client = self.client()?;
        let sql = query::equipment_query(filter);
        tracing::debug!("Executing query: {} {:?}", sql.query, sql.parameters);

        let documents = client.query(&sql).await.map_err(|e| {
            match e {
                StoreError::Status { status: 400, .. } => tracing::error!(
                    "Cosmos DB rejected the query, cross-partition ORDER BY may need a query plan: {}",
                    e
                ),
                _ => tracing::error!("Cosmos DB query failed: {}", e),
            }
            AppError::QueryFailure(e.to_string())
        })?;

        // One malformed document must not fail the whole read
        let mut records: Vec<Equipment> = documents
            .into_iter()
            .filter_map(|document| {
                let id = document["id"].as_str().unwrap_or_default().to_string();
                serde_json::from_value(document)
                    .map_err(|e| tracing::warn!("Skipping equipment document {:?}: {}", id, e))
                    .ok()
            })
            .collect();

        // Pages from several partitions are not merged in order by the gateway
        records.sort_by_key(|e| e.equipment_id);

        tracing::info!("Fetched {} equipment from Cosmos DB", records.len());
        Ok(records)
    }
}
