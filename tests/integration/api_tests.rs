//! API integration tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use equipment_status_server::{
    api,
    repository::{
        cosmos::{DocumentClient, SqlQuery, StoreError},
        DocumentStore, Repository, StaticCatalog,
    },
    services::Services,
    AppState,
};

/// Container that fails every query and records writes
#[derive(Default)]
struct FlakyContainer {
    documents: Mutex<Vec<Value>>,
}

#[async_trait]
impl DocumentClient for FlakyContainer {
    async fn query(&self, query: &SqlQuery) -> Result<Vec<Value>, StoreError> {
        if let Some(id) = query.parameter("@id") {
            let documents = self.documents.lock().unwrap();
            return Ok(documents.iter().filter(|d| &d["id"] == id).cloned().collect());
        }
        Err(StoreError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        })
    }

    async fn create(&self, _partition_key: &str, document: &Value) -> Result<Value, StoreError> {
        self.documents.lock().unwrap().push(document.clone());
        Ok(document.clone())
    }

    async fn upsert(&self, _partition_key: &str, document: &Value) -> Result<Value, StoreError> {
        let mut documents = self.documents.lock().unwrap();
        documents.retain(|d| d["id"] != document["id"]);
        documents.push(document.clone());
        Ok(document.clone())
    }
}

fn app(store: DocumentStore) -> Router {
    let repository = Repository::new(StaticCatalog::sample().expect("sample catalog"), store);
    api::router(AppState {
        services: Arc::new(Services::new(repository)),
    })
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|e| e["equipmentId"].as_i64().expect("equipmentId"))
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get(app(DocumentStore::disconnected()), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_reports_store() {
    let (_, body) = get(app(DocumentStore::disconnected()), "/api/v1/ready").await;
    assert_eq!(body["document_store_connected"], false);

    let store = DocumentStore::with_client(Arc::new(FlakyContainer::default()));
    let (_, body) = get(app(store), "/api/v1/ready").await;
    assert_eq!(body["document_store_connected"], true);
}

#[tokio::test]
async fn test_equipment_status_envelope() {
    let (status, body) = get(app(DocumentStore::disconnected()), "/api/v1/equipment-status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(body["count"], 8);
    assert_eq!(ids(&body), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(body["filters_applied"], json!({}));
    assert_eq!(body["data_source"], "sample");
    assert_eq!(body["degraded"], false);
    assert_eq!(body["statistics"]["totalEquipment"], 8);
    assert_eq!(body["statistics"]["activeEquipment"], 7);
    assert_eq!(body["statistics"]["maintenanceEquipment"], 1);
    assert_eq!(body["statistics"]["averageEfficiency"], 96.3);
    assert_eq!(body["statistics"]["totalOperatingHours"], 12586);
}

#[tokio::test]
async fn test_body_is_pretty_utf8() {
    let response = app(DocumentStore::disconnected())
        .oneshot(
            Request::builder()
                .uri("/api/v1/equipment-status?equipmentType=Motor")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("\n  \"status\": \"success\""));
    assert!(text.contains("第1製造ライン主モーター"));
}

#[tokio::test]
async fn test_filters_and_echo() {
    let (_, body) = get(
        app(DocumentStore::disconnected()),
        "/api/v1/equipment-status?status=Active&equipmentType=Robot",
    )
    .await;

    assert_eq!(ids(&body), vec![2]);
    assert_eq!(
        body["filters_applied"],
        json!({ "status": "Active", "equipmentType": "Robot" })
    );
    assert_eq!(body["statistics"]["averageEfficiency"], 98.1);
}

#[tokio::test]
async fn test_location_filter_is_percent_decoded() {
    // 第2工場
    let (_, body) = get(
        app(DocumentStore::disconnected()),
        "/api/v1/equipment-status?location=%E7%AC%AC2%E5%B7%A5%E5%A0%B4",
    )
    .await;
    assert_eq!(ids(&body), vec![6, 7]);
}

#[tokio::test]
async fn test_limit() {
    let (_, body) = get(app(DocumentStore::disconnected()), "/api/v1/equipment-status?limit=3").await;
    assert_eq!(ids(&body), vec![1, 2, 3]);
    assert_eq!(body["count"], 3);

    let (status, body) = get(app(DocumentStore::disconnected()), "/api/v1/equipment-status?limit=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 8);
}

#[tokio::test]
async fn test_invalid_status_is_bad_request() {
    let (status, body) = get(
        app(DocumentStore::disconnected()),
        "/api/v1/equipment-status?status=Running",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_query_string_rejection_uses_error_envelope() {
    let (status, body) = get(
        app(DocumentStore::disconnected()),
        "/api/v1/equipment-status?status=Active&status=Inactive",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("status"));
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let store = DocumentStore::with_client(Arc::new(FlakyContainer::default()));
    let response = app(store)
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/api/v1/equipment/1/status")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"status\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_non_numeric_id_uses_error_envelope() {
    let (status, body) = send(
        app(DocumentStore::disconnected()),
        Method::PUT,
        "/api/v1/equipment/abc/status",
        Some(json!({ "status": "Inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_store_failure_falls_back_to_sample() {
    let store = DocumentStore::with_client(Arc::new(FlakyContainer::default()));
    let (status, body) = get(app(store), "/api/v1/equipment-status?status=Maintenance").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![6]);
    assert_eq!(body["data_source"], "sample");
    assert_eq!(body["degraded"], true);
}

#[tokio::test]
async fn test_preflight_and_method_not_allowed() {
    let (status, _) = send(
        app(DocumentStore::disconnected()),
        Method::OPTIONS,
        "/api/v1/equipment-status",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app(DocumentStore::disconnected()),
        Method::DELETE,
        "/api/v1/equipment-status",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn test_cors_header_on_get() {
    let response = app(DocumentStore::disconnected())
        .oneshot(
            Request::builder()
                .uri("/api/v1/equipment-status")
                .header(header::ORIGIN, "http://localhost:8081")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_maintenance_listing() {
    let (status, body) = get(
        app(DocumentStore::disconnected()),
        "/api/v1/equipment-status/maintenance",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 5, 6, 7]);
    assert_eq!(body["data"][3]["statusLabel"], "メンテナンス中");
    assert_eq!(body["data"][0]["isMaintenanceRequired"], true);
}

#[tokio::test]
async fn test_types_and_locations() {
    let (_, types) = get(app(DocumentStore::disconnected()), "/api/v1/equipment-types").await;
    assert_eq!(types.as_array().unwrap().len(), 8);
    assert_eq!(types[0], "CNC");

    let (_, locations) = get(app(DocumentStore::disconnected()), "/api/v1/locations").await;
    assert_eq!(locations.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_writes_without_store_are_unavailable() {
    let (status, body) = send(
        app(DocumentStore::disconnected()),
        Method::PUT,
        "/api/v1/equipment/1/status",
        Some(json!({ "status": "Inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_create_then_update_status() {
    let container = Arc::new(FlakyContainer::default());
    let store = DocumentStore::with_client(container.clone());
    let app = app(store);

    let (status, created) = send(
        app.clone(),
        Method::POST,
        "/api/v1/equipment",
        Some(json!({
            "equipmentId": 9,
            "equipmentName": "Cooling tower",
            "equipmentType": "Cooling",
            "location": "Factory-2 Roof",
            "maintenanceCycleHours": 2000,
            "status": "Active",
            "operatingHours": 10,
            "efficiency": 93.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "equipment_9");
    assert_eq!(created["partitionKey"], "Cooling");

    let (status, updated) = send(
        app.clone(),
        Method::PUT,
        "/api/v1/equipment/9/status",
        Some(json!({ "status": "Maintenance" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Maintenance");
    assert!(updated["lastUpdated"].is_string());

    let stored = container.documents.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["status"], "Maintenance");
}

#[tokio::test]
async fn test_update_unknown_equipment_is_not_found() {
    let container = Arc::new(FlakyContainer::default());
    let store = DocumentStore::with_client(container.clone());

    let (status, body) = send(
        app(store),
        Method::PUT,
        "/api/v1/equipment/404/status",
        Some(json!({ "status": "Inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert!(container.documents.lock().unwrap().is_empty());
}
