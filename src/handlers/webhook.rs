//! Webhook endpoint.
//!
//! The gateway inspects the response body, not the HTTP status, so this
//! handler always answers 200: `{"result": true, "platform": {...}}` when
//! the delivery was handled, `{"result": false}` for any caught failure.
//! Returning a 5xx would only provoke delivery retries.

use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::AppState;
use crate::webhook::{WebhookDelivery, WebhookError};

#[derive(Debug, Deserialize)]
pub struct WebhookParams {
    #[serde(default)]
    pub mobbex_order_id: Option<String>,
    #[serde(default)]
    pub mobbex_token: Option<String>,
}

fn success_body() -> Value {
    json!({
        "result": true,
        "platform": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "ecommerce": {
                "engine": "sqlite",
                "schema": "1"
            }
        }
    })
}

fn failure_body() -> Value {
    json!({ "result": false })
}

pub async fn mobbex_webhook(
    State(state): State<AppState>,
    axum::extract::Query(params): axum::extract::Query<WebhookParams>,
    body: Bytes,
) -> Json<Value> {
    let parsed: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("Webhook body is not valid JSON: {}", e);
            return Json(failure_body());
        }
    };

    // The canonical payload is the `data` sub-object when present.
    let payload = match parsed.get("data") {
        Some(data) => data.clone(),
        None => parsed,
    };

    let delivery = WebhookDelivery {
        order_id: params.mobbex_order_id.unwrap_or_default(),
        token: params.mobbex_token.unwrap_or_default(),
        payload,
    };

    let mut conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("DB connection error: {}", e);
            return Json(failure_body());
        }
    };

    match state.engine.process(&mut conn, &delivery) {
        Ok(_) => Json(success_body()),
        Err(e) => {
            // Failure kinds stay distinguishable for logging; the gateway
            // only ever sees the soft false.
            match &e {
                WebhookError::MissingParams | WebhookError::InvalidToken => {
                    tracing::debug!("Webhook rejected: {}", e)
                }
                WebhookError::OrderNotFound(id) => {
                    tracing::warn!("Webhook for unknown order {}", id)
                }
                WebhookError::Storage(err) => tracing::error!("Webhook storage error: {}", err),
                WebhookError::Database(err) => tracing::error!("Webhook database error: {}", err),
            }
            Json(failure_body())
        }
    }
}
