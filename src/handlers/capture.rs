//! Capture endpoint for authorized (two-step) payments.
//!
//! Unlike the webhook, this is an operator-facing API: failures surface as
//! real HTTP errors instead of a soft body.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::gateway::MobbexClient;

#[derive(Debug, Deserialize, Default)]
pub struct CaptureRequest {
    /// Amount to capture. Defaults to the order total.
    pub total: Option<f64>,
}

pub async fn capture_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(req): Json<CaptureRequest>,
) -> Result<Json<Value>> {
    let (order, payment_id) = {
        let conn = state.db.get()?;
        let order = queries::get_order(&conn, &order_id)?
            .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;
        let payment_id = order
            .payment_id
            .clone()
            .ok_or_else(|| AppError::BadRequest("Order has no payment to capture".into()))?;
        (order, payment_id)
    };

    let total = req.total.unwrap_or(order.total);

    let client = MobbexClient::new(&state.config, state.http_client.clone());
    client.capture(&payment_id, total).await?;

    {
        let conn = state.db.get()?;
        queries::add_order_note(
            &conn,
            &order_id,
            &format!("Se capturó el pago por un total de {}", total),
        )?;
    }

    tracing::info!(order_id = %order_id, payment_id = %payment_id, total, "Payment captured");

    Ok(Json(json!({ "result": true, "total": total })))
}
