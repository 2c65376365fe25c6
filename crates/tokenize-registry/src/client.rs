//! # HTTP Registry Client
//!
//! Thin reqwest client for the company-registry API.
//!
//! Request shape: `GET {base_url}?key={api_key}&inn={tax_id}`.
//! Response shape:
//!
//! ```json
//! {
//!   "meta":    { "status": "ok", "message": "..." },
//!   "company": { "name": "...", "short_name": "...", "status": "ACTIVE",
//!                "registration_date": "...", "address": "...",
//!                "revenue": 12345600 }
//! }
//! ```
//!
//! Every failure mode (transport, non-2xx, unparsable JSON, a non-ok
//! meta status, missing company data) maps to `LookupError::Remote`
//! with the upstream message passed through.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{CompanyInfo, CompanyLookup, LookupError};

/// HTTP client for the company registry.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RegistryResponse {
    #[serde(default)]
    meta: Option<ResponseMeta>,
    #[serde(default)]
    company: Option<CompanyPayload>,
}

#[derive(Debug, Deserialize)]
struct ResponseMeta {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompanyPayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    registration_date: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    revenue: Option<i64>,
}

impl HttpRegistryClient {
    /// Creates a client for the given endpoint and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LookupError::Remote(format!("http client init: {e}")))?;

        Ok(HttpRegistryClient {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl CompanyLookup for HttpRegistryClient {
    async fn lookup(&self, tax_id: &str) -> Result<CompanyInfo, LookupError> {
        debug!(tax_id = %tax_id, "Registry lookup");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("inn", tax_id)])
            .send()
            .await
            .map_err(|e| LookupError::Remote(format!("network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Registry returned an error status");
            return Err(LookupError::Remote(format!(
                "http error {status}: {body}"
            )));
        }

        let payload: RegistryResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Remote(format!("invalid registry response: {e}")))?;

        if let Some(meta) = &payload.meta {
            if meta.status != "ok" {
                let message = meta.message.as_deref().unwrap_or("unknown registry error");
                return Err(LookupError::Remote(message.to_string()));
            }
        }

        let company = payload
            .company
            .ok_or_else(|| LookupError::Remote("no company data in response".to_string()))?;

        let name = company
            .name
            .ok_or_else(|| LookupError::Remote("company record has no name".to_string()))?;

        Ok(CompanyInfo {
            name,
            short_name: company.short_name,
            status: company.status.unwrap_or_default(),
            registration_date: company.registration_date,
            address: company.address,
            revenue_cents: company.revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_parses() {
        let raw = r#"{
            "meta": { "status": "ok" },
            "company": {
                "name": "Sberbank PJSC",
                "short_name": "Sberbank",
                "status": "ACTIVE",
                "registration_date": "1991-06-20",
                "address": "Moscow",
                "revenue": 550000000
            }
        }"#;

        let parsed: RegistryResponse = serde_json::from_str(raw).unwrap();
        let company = parsed.company.unwrap();
        assert_eq!(company.name.as_deref(), Some("Sberbank PJSC"));
        assert_eq!(company.status.as_deref(), Some("ACTIVE"));
        assert_eq!(company.revenue, Some(550_000_000));
    }

    #[test]
    fn meta_error_is_detectable() {
        let raw = r#"{ "meta": { "status": "error", "message": "bad key" } }"#;
        let parsed: RegistryResponse = serde_json::from_str(raw).unwrap();
        let meta = parsed.meta.unwrap();
        assert_eq!(meta.status, "error");
        assert_eq!(meta.message.as_deref(), Some("bad key"));
        assert!(parsed.company.is_none());
    }
}
