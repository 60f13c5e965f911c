//! Orchestrates one webhook delivery: authenticate, normalize, persist,
//! and (for parent transactions) apply order mutations.
//!
//! The pipeline is `RECEIVED -> AUTHENTICATED -> NORMALIZED -> PERSISTED ->
//! (child: done | parent: MUTATING -> DONE)`. Any failure maps to a typed
//! [`WebhookError`]; the HTTP layer collapses all of them into a soft
//! `{"result": false}` so the gateway never sees a hard error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use serde_json::Value;
use thiserror::Error;

use crate::db::queries;
use crate::error::AppError;
use crate::forwarder::{spawn_webhook_event, WebhookProcessedEvent};
use crate::models::Transaction;
use crate::token::TokenAuthenticator;
use crate::webhook::normalizer::normalize;
use crate::webhook::status::{is_approved, map_status, VOID_STATUS_CODE};

/// One inbound webhook call: the two query credentials plus the canonical
/// payload (the `data` sub-object when the body carries one).
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    pub order_id: String,
    pub token: String,
    pub payload: Value,
}

#[derive(Debug)]
pub enum WebhookOutcome {
    /// Child/split payment: persisted for audit, no order mutation.
    Child { payment_id: String },
    /// Parent payment: persisted and order mutations applied.
    Parent { payment_id: String },
}

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("missing status, order id, or token")]
    MissingParams,

    #[error("invalid webhook token")]
    InvalidToken,

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error(transparent)]
    Storage(#[from] AppError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Advisory per-order locks. The full mutation sequence runs under the
/// order's lock so concurrent deliveries cannot race on the
/// total-adjustment guard.
#[derive(Default)]
struct OrderLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    fn acquire(&self, order_id: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(order_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the entry once no caller holds it anymore; the map only keeps
    /// locks for orders with a delivery in flight.
    fn release(&self, order_id: &str) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(lock) = map.get(order_id) {
            if Arc::strong_count(lock) == 1 {
                map.remove(order_id);
            }
        }
    }
}

/// A usable status code is present and non-empty. The gateway sends codes
/// as numbers or numeric strings; an empty or blank string counts as absent.
fn has_status_code(payload: &Value) -> bool {
    match payload.pointer("/payment/status/code") {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => !s.trim().is_empty(),
        _ => false,
    }
}

pub struct ReconciliationEngine {
    token: TokenAuthenticator,
    coupon_url: String,
    http_client: reqwest::Client,
    forward_url: Option<String>,
    locks: OrderLocks,
}

impl ReconciliationEngine {
    pub fn new(
        token: TokenAuthenticator,
        coupon_url: String,
        http_client: reqwest::Client,
        forward_url: Option<String>,
    ) -> Self {
        Self {
            token,
            coupon_url,
            http_client,
            forward_url,
            locks: OrderLocks::default(),
        }
    }

    /// The token authenticator, shared with the return-URL handler.
    pub fn authenticator(&self) -> &TokenAuthenticator {
        &self.token
    }

    /// Handle one webhook delivery end to end.
    ///
    /// The transaction record is inserted before parent/child branching, so
    /// even non-approved and child deliveries leave an audit row. Nothing is
    /// persisted for deliveries that fail authentication.
    pub fn process(
        &self,
        conn: &mut Connection,
        delivery: &WebhookDelivery,
    ) -> Result<WebhookOutcome, WebhookError> {
        // RECEIVED -> AUTHENTICATED
        if delivery.order_id.is_empty()
            || delivery.token.is_empty()
            || !has_status_code(&delivery.payload)
        {
            tracing::debug!("Webhook rejected: missing status, order id, or token");
            return Err(WebhookError::MissingParams);
        }

        if !self.token.validate(&delivery.token) {
            tracing::debug!(order_id = %delivery.order_id, "Webhook rejected: invalid token");
            return Err(WebhookError::InvalidToken);
        }

        // AUTHENTICATED -> NORMALIZED -> PERSISTED
        let record = normalize(&delivery.order_id, &delivery.payload);
        let transaction = queries::insert_transaction(conn, &record)?;

        tracing::debug!(
            order_id = %transaction.order_id,
            payment_id = %transaction.payment_id,
            status = transaction.status_code,
            parent = transaction.parent,
            "Webhook transaction persisted"
        );

        if !transaction.parent {
            return Ok(WebhookOutcome::Child {
                payment_id: transaction.payment_id,
            });
        }

        // PERSISTED -> MUTATING (parent only), serialized per order
        let mutated = {
            let lock = self.locks.acquire(&delivery.order_id);
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            self.mutate_order(conn, &transaction)
        };
        self.locks.release(&delivery.order_id);
        mutated?;

        // MUTATING -> DONE: notify external subscribers
        spawn_webhook_event(
            self.http_client.clone(),
            self.forward_url.clone(),
            WebhookProcessedEvent {
                order_id: transaction.order_id.clone(),
                payload: transaction.payload().unwrap_or(Value::Null),
                timestamp: Utc::now().timestamp(),
            },
        );

        Ok(WebhookOutcome::Parent {
            payment_id: transaction.payment_id,
        })
    }

    /// Apply the order mutation sequence for a parent transaction.
    /// Runs inside a database transaction: the order either reflects the
    /// whole delivery or none of it.
    fn mutate_order(&self, conn: &mut Connection, record: &Transaction) -> Result<(), WebhookError> {
        let order = queries::get_order(conn, &record.order_id)?
            .ok_or_else(|| WebhookError::OrderNotFound(record.order_id.clone()))?;

        let tx = conn.transaction()?;

        // 1. Raw payload and payment id as metadata, last delivery wins.
        queries::set_order_webhook_meta(&tx, &order.id, &record.data, &record.payment_id)?;

        // 2. Coupon URL from the template, when the entity is known.
        if !record.entity_uid.is_empty() {
            let coupon_url = self
                .coupon_url
                .replace("{entity.uid}", &record.entity_uid)
                .replace("{payment.id}", &record.payment_id);

            queries::set_order_coupon_url(&tx, &order.id, &coupon_url)?;
            queries::add_order_note(&tx, &order.id, &format!("URL al Cupón: {}", coupon_url))?;
        }

        // 3. Payment-method note. Appended on every delivery; duplicate
        //    deliveries produce duplicate notes (no dedup key).
        let mut note = format!("ID de Operación Mobbex: {}. ", record.payment_id);

        if record.source_type == "card" {
            let card_info = format!("{} ( {} )", record.source_name, record.source_number);
            let plan = format!(
                "{}. {} Cuota/s de {}",
                record.installment_name, record.installment_count, record.installment_amount
            );

            queries::set_order_card_meta(&tx, &order.id, &card_info, &plan)?;
            note.push_str(&format!("Pago realizado con {}. {}. ", card_info, plan));
        } else {
            note.push_str(&format!("Pago realizado con {}. ", record.source_name));
        }

        queries::add_order_note(&tx, &order.id, &note)?;

        // 4. Risk analysis note and metadata.
        if record.risk_analysis > 0 {
            queries::add_order_note(
                &tx,
                &order.id,
                &format!(
                    "El riesgo de la operación fue evaluado en: {}",
                    record.risk_analysis
                ),
            )?;
            queries::set_order_risk_analysis(&tx, &order.id, record.risk_analysis)?;
        }

        // 5. Displayed payment method.
        if !record.source_name.is_empty() {
            queries::set_payment_method_title(
                &tx,
                &order.id,
                &format!("{} a través de Mobbex", record.source_name),
            )?;
        }

        // 6-7. Lifecycle state, with the gateway message as an order note.
        //    Payment completion is keyed on the approved bucket, not on the
        //    mapped label, and is a repository-level no-op when already paid.
        queries::update_order_status(&tx, &order.id, map_status(record.status_code))?;
        if !record.status_message.is_empty() {
            queries::add_order_note(&tx, &order.id, &record.status_message)?;
        }
        if is_approved(record.status_code) {
            queries::mark_order_paid(&tx, &order.id, &record.payment_id)?;
        }

        // 8. Total adjustment, guarded: equal totals, the void code, and an
        //    already-adjusted order all skip the fee line.
        if order.total != record.total
            && record.status_code != VOID_STATUS_CODE
            && !order.total_adjusted
        {
            let name = if record.total > order.total {
                "Cargo financiero"
            } else {
                "Descuento"
            };
            queries::apply_order_fee(&tx, &order.id, name, record.total - order.total)?;
        }

        // 9. Authoritative total overwrite. Always runs: the guard above
        //    only protects the fee line item, not the total assignment.
        queries::set_order_total(&tx, &order.id, record.total)?;

        tx.commit()?;

        tracing::info!(
            order_id = %order.id,
            payment_id = %record.payment_id,
            status = record.status_code,
            total = record.total,
            "Order reconciled from webhook"
        );

        Ok(())
    }
}
