//! Document client for a Cosmos DB SQL container

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::HeaderMap, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::{
    auth::{http_date, MasterKey},
    query::SqlQuery,
};
use crate::config::CosmosConfig;

const API_VERSION: &str = "2018-12-31";
const RESOURCE_TYPE: &str = "docs";
const CONTINUATION_HEADER: &str = "x-ms-continuation";

/// Transport-level document store error
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid credentials: {0}")]
    Credentials(String),
}

/// Minimal document operations on one container
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Run a cross-partition query and collect every page
    async fn query(&self, query: &SqlQuery) -> Result<Vec<Value>, StoreError>;

    async fn create(&self, partition_key: &str, document: &Value) -> Result<Value, StoreError>;

    async fn upsert(&self, partition_key: &str, document: &Value) -> Result<Value, StoreError>;
}

#[derive(Deserialize)]
struct QueryPage {
    #[serde(rename = "Documents", default)]
    documents: Vec<Value>,
}

/// REST client for the Cosmos DB SQL API
#[derive(Debug, Clone)]
pub struct CosmosClient {
    http: reqwest::Client,
    key: MasterKey,
    docs_url: Url,
    resource_link: String,
}

impl CosmosClient {
    /// Build a client for the configured container.
    ///
    /// Fails when credentials are missing or malformed; no request is sent.
    pub fn new(config: &CosmosConfig) -> Result<Self, StoreError> {
        let (endpoint, key) = config
            .credentials()
            .ok_or_else(|| StoreError::Credentials("endpoint and key are required".to_string()))?;

        let key = MasterKey::from_base64(key)?;
        let resource_link = format!("dbs/{}/colls/{}", config.database, config.container);
        let docs_url = Url::parse(endpoint)
            .and_then(|base| base.join(&format!("{}/{}", resource_link, RESOURCE_TYPE)))
            .map_err(|e| StoreError::Credentials(format!("invalid endpoint {}: {}", endpoint, e)))?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            key,
            docs_url,
            resource_link,
        })
    }

    fn request(&self, partition_key: Option<&str>) -> Result<RequestBuilder, StoreError> {
        let date = http_date(Utc::now());
        let authorization =
            self.key
                .authorization(Method::POST.as_str(), RESOURCE_TYPE, &self.resource_link, &date)?;

        let mut builder = self
            .http
            .request(Method::POST, self.docs_url.clone())
            .header("authorization", authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .header("x-ms-activity-id", uuid::Uuid::new_v4().to_string());

        if let Some(key) = partition_key {
            builder = builder.header(
                "x-ms-documentdb-partitionkey",
                serde_json::to_string(&[key])?,
            );
        }
        Ok(builder)
    }

    async fn send(builder: RequestBuilder) -> Result<(HeaderMap, Value), StoreError> {
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body)?
        };
        Ok((headers, value))
    }
}

/// `message` field of an error body, else the raw body or the status reason
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .or_else(|| (!body.is_empty()).then(|| body.to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string())
}

#[async_trait]
impl DocumentClient for CosmosClient {
    async fn query(&self, query: &SqlQuery) -> Result<Vec<Value>, StoreError> {
        let mut documents = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut builder = self
                .request(None)?
                .header("content-type", "application/query+json")
                .header("x-ms-documentdb-isquery", "True")
                .header("x-ms-documentdb-query-enablecrosspartition", "True")
                .json(query);
            if let Some(ref token) = continuation {
                builder = builder.header(CONTINUATION_HEADER, token.as_str());
            }

            let (headers, body) = Self::send(builder).await?;
            let page: QueryPage = serde_json::from_value(body)?;
            tracing::debug!("Query page returned {} documents", page.documents.len());
            documents.extend(page.documents);

            continuation = headers
                .get(CONTINUATION_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            if continuation.is_none() {
                break;
            }
        }

        Ok(documents)
    }

    async fn create(&self, partition_key: &str, document: &Value) -> Result<Value, StoreError> {
        let builder = self.request(Some(partition_key))?.json(document);
        let (_, created) = Self::send(builder).await?;
        Ok(created)
    }

    async fn upsert(&self, partition_key: &str, document: &Value) -> Result<Value, StoreError> {
        let builder = self
            .request(Some(partition_key))?
            .header("x-ms-documentdb-is-upsert", "True")
            .json(document);
        let (_, upserted) = Self::send(builder).await?;
        Ok(upserted)
    }
}
