//! Master-key request signing for the Cosmos DB REST API

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::client::StoreError;

type HmacSha256 = Hmac<Sha256>;

/// Decoded account key
#[derive(Clone)]
pub struct MasterKey(Vec<u8>);

impl MasterKey {
    pub fn from_base64(key: &str) -> Result<Self, StoreError> {
        STANDARD
            .decode(key.trim())
            .map(MasterKey)
            .map_err(|e| StoreError::Credentials(format!("key is not valid base64: {}", e)))
    }

    /// `Authorization` header value for one request.
    ///
    /// `date` must be the exact value sent in `x-ms-date`.
    pub fn authorization(
        &self,
        verb: &str,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> Result<String, StoreError> {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );

        let mut mac = HmacSha256::new_from_slice(&self.0)
            .map_err(|e| StoreError::Credentials(e.to_string()))?;
        mac.update(payload.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        let token = format!("type=master&ver=1.0&sig={}", signature);
        Ok(url::form_urlencoded::byte_serialize(token.as_bytes()).collect())
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// RFC 1123 date for the `x-ms-date` header
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
