//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Equipment Status API",
        version = "1.0.0",
        description = "Factory equipment operating status REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Equipment
        equipment::get_equipment_status,
        equipment::get_maintenance_due,
        equipment::list_equipment_types,
        equipment::list_locations,
        equipment::create_equipment,
        equipment::update_equipment_status,
    ),
    components(
        schemas(
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipmentStatus,
            crate::models::equipment::MaintenanceEntry,
            crate::models::query::EquipmentFilter,
            crate::models::statistics::EquipmentStatistics,
            crate::repository::DataSource,
            equipment::EquipmentStatusResponse,
            equipment::MaintenanceResponse,
            equipment::StoredEquipment,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "equipment", description = "Equipment operating status")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
