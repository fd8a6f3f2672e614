//! Equipment status API endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use super::{ApiJson, ApiPath, ApiQuery, PrettyJson};
use crate::{
    error::AppResult,
    models::{
        CreateEquipment, Equipment, EquipmentDocument, EquipmentFilter, EquipmentStatistics,
        EquipmentStatusQuery, MaintenanceEntry, UpdateEquipmentStatus,
    },
    repository::DataSource,
    utc_timestamp, AppState,
};

/// Equipment status response
#[derive(Serialize, ToSchema)]
pub struct EquipmentStatusResponse {
    /// Always `success`
    pub status: String,
    pub timestamp: String,
    pub statistics: EquipmentStatistics,
    pub data: Vec<Equipment>,
    pub count: usize,
    pub filters_applied: EquipmentFilter,
    /// Provider that served the records
    pub data_source: DataSource,
    /// True when the document store failed and sample data was served
    pub degraded: bool,
}

/// Equipment requiring maintenance
#[derive(Serialize, ToSchema)]
pub struct MaintenanceResponse {
    pub status: String,
    pub timestamp: String,
    pub data: Vec<MaintenanceEntry>,
    pub count: usize,
    pub data_source: DataSource,
    pub degraded: bool,
}

/// Equipment as written to the document store
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredEquipment {
    pub id: String,
    pub partition_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub equipment: Equipment,
}

impl From<EquipmentDocument> for StoredEquipment {
    fn from(document: EquipmentDocument) -> Self {
        Self {
            partition_key: document.partition().to_string(),
            id: document.id,
            last_updated: document.last_updated,
            equipment: document.equipment,
        }
    }
}

/// Get equipment operating status
#[utoipa::path(
    get,
    path = "/equipment-status",
    tag = "equipment",
    params(EquipmentStatusQuery),
    responses(
        (status = 200, description = "Filtered equipment with statistics", body = EquipmentStatusResponse),
        (status = 400, description = "Invalid status filter or query string", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment_status(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EquipmentStatusQuery>,
) -> AppResult<PrettyJson<EquipmentStatusResponse>> {
    let report = state.services.equipment.status_report(&query).await?;

    Ok(PrettyJson(EquipmentStatusResponse {
        status: "success".to_string(),
        timestamp: utc_timestamp(),
        statistics: report.statistics,
        count: report.records.len(),
        data: report.records,
        filters_applied: report.filters,
        data_source: report.source,
        degraded: report.degraded,
    }))
}

/// CORS preflight for the status endpoint
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        PrettyJson(json!({ "error": "Method not allowed" })),
    )
}

/// List equipment that requires maintenance
#[utoipa::path(
    get,
    path = "/equipment-status/maintenance",
    tag = "equipment",
    responses(
        (status = 200, description = "Equipment under maintenance or past its cycle", body = MaintenanceResponse)
    )
)]
pub async fn get_maintenance_due(State(state): State<AppState>) -> PrettyJson<MaintenanceResponse> {
    let (entries, outcome) = state.services.equipment.maintenance_due().await;

    PrettyJson(MaintenanceResponse {
        status: "success".to_string(),
        timestamp: utc_timestamp(),
        count: entries.len(),
        data: entries,
        data_source: outcome.source(),
        degraded: outcome.is_degraded(),
    })
}

/// List known equipment types
#[utoipa::path(
    get,
    path = "/equipment-types",
    tag = "equipment",
    responses(
        (status = 200, description = "Sorted equipment types", body = Vec<String>)
    )
)]
pub async fn list_equipment_types(State(state): State<AppState>) -> PrettyJson<Vec<String>> {
    PrettyJson(state.services.equipment.equipment_types())
}

/// List known locations
#[utoipa::path(
    get,
    path = "/locations",
    tag = "equipment",
    responses(
        (status = 200, description = "Sorted locations", body = Vec<String>)
    )
)]
pub async fn list_locations(State(state): State<AppState>) -> PrettyJson<Vec<String>> {
    PrettyJson(state.services.equipment.locations())
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = StoredEquipment),
        (status = 400, description = "Invalid equipment", body = crate::error::ErrorResponse),
        (status = 502, description = "Document store rejected the write", body = crate::error::ErrorResponse),
        (status = 503, description = "Document store not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateEquipment>,
) -> AppResult<(StatusCode, PrettyJson<StoredEquipment>)> {
    let document = state.services.equipment.create(data).await?;
    Ok((StatusCode::CREATED, PrettyJson(document.into())))
}

/// Update equipment status
#[utoipa::path(
    put,
    path = "/equipment/{id}/status",
    tag = "equipment",
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body = UpdateEquipmentStatus,
    responses(
        (status = 200, description = "Status updated", body = StoredEquipment),
        (status = 400, description = "Malformed id or body", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown equipment", body = crate::error::ErrorResponse),
        (status = 503, description = "Document store not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(data): ApiJson<UpdateEquipmentStatus>,
) -> AppResult<PrettyJson<StoredEquipment>> {
    let document = state
        .services
        .equipment
        .update_status(id, &data.status)
        .await?;
    Ok(PrettyJson(document.into()))
}
