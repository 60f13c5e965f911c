//! Outbound Mobbex API client.
//!
//! Read operations (payment sources, advanced-rule installments) degrade to
//! an empty result on any upstream failure. The capture write raises a
//! typed error instead; it is a single attempt with no retry - retrying is
//! the caller's responsibility.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct MobbexClient {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: String,
    ready: bool,
}

impl MobbexClient {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
            ready: config.is_ready(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/{}", self.base_url, path))
            .header("cache-control", "no-cache")
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("x-access-token", &self.access_token)
    }

    /// Fetch payment sources for a total, filtered by installment tokens
    /// (`-plan` exclusions and `+uid:plan` inclusions from plan
    /// eligibility). Empty on any upstream failure.
    pub async fn get_sources(&self, total: Option<f64>, installments: &[String]) -> Vec<Value> {
        if !self.ready {
            return Vec::new();
        }

        let query = crate::plans::installments_query(total, installments);
        let path = if query.is_empty() {
            "sources".to_string()
        } else {
            format!("sources?{}", query)
        };

        self.fetch_data(&path).await
    }

    /// Fetch installments for an advanced matching rule.
    /// Empty on any upstream failure.
    pub async fn get_sources_advanced(&self, rule: &str) -> Vec<Value> {
        if !self.ready {
            return Vec::new();
        }

        self.fetch_data(&format!("sources/rules/{}/installments", rule))
            .await
    }

    async fn fetch_data(&self, path: &str) -> Vec<Value> {
        let response = match self.get(path).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Mobbex API request failed: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Mobbex API returned {} for {}", response.status(), path);
            return Vec::new();
        }

        match response.json::<ApiEnvelope>().await {
            Ok(envelope) => match envelope.data {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            },
            Err(e) => {
                tracing::warn!("Malformed Mobbex API response: {}", e);
                Vec::new()
            }
        }
    }

    /// Capture a previously authorized payment for the given amount.
    ///
    /// Preconditions: integration ready, non-empty payment id, positive
    /// total. Returns `Ok(true)` only when the gateway signals success; any
    /// other outcome is an error.
    pub async fn capture(&self, payment_id: &str, total: f64) -> Result<bool> {
        if !self.ready {
            return Err(AppError::NotReady(
                "capture requires the integration enabled with credentials configured".into(),
            ));
        }

        if payment_id.is_empty() || total <= 0.0 {
            return Err(AppError::BadRequest("Empty payment id or total".into()));
        }

        let response = self
            .client
            .post(format!("{}/operations/{}/capture", self.base_url, payment_id))
            .header("cache-control", "no-cache")
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("x-access-token", &self.access_token)
            .json(&serde_json::json!({ "total": total }))
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("capture request failed: {}", e)))?;

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("malformed capture response: {}", e)))?;

        if envelope.result {
            Ok(true)
        } else {
            Err(AppError::Gateway("capture was not accepted".into()))
        }
    }
}
