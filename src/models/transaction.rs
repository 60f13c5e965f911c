use serde::{Deserialize, Serialize};

/// One persisted webhook delivery, flattened from the gateway payload.
///
/// Rows are append-only: every delivery inserts a new row, duplicates
/// included. `(order_id, payment_id)` identifies a payment conceptually but
/// no uniqueness is enforced - the table is the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,

    // Identity
    pub order_id: String,
    pub payment_id: String,
    pub checkout_uid: String,
    pub entity_uid: String,
    pub entity_name: String,

    // Classification
    /// Top-level payment vs. a child of a split payment (`CHD-` prefix).
    pub parent: bool,
    pub operation_type: String,
    /// Child payment references, serialized JSON.
    pub childs: String,

    // Status
    pub status_code: i64,
    pub status_message: String,
    pub description: String,

    // Payment source detail. Nested gateway objects are kept as serialized
    // JSON strings; use the typed accessors to parse them.
    pub source_name: String,
    pub source_type: String,
    pub source_reference: String,
    pub source_number: String,
    pub source_expiration: String,
    pub source_installment: String,
    pub installment_name: String,
    pub installment_amount: f64,
    pub installment_count: i64,
    pub source_url: String,
    pub cardholder: String,
    pub customer: String,

    // Money
    pub total: f64,
    pub currency: String,
    /// Risk analysis level reported by the gateway, 0 when absent.
    pub risk_analysis: i64,

    // Bookkeeping
    /// Full original payload, retained for audit and replay.
    pub data: String,
    pub created: String,
    pub updated: String,

    pub created_at: i64,
}

/// Normalized record produced by the webhook normalizer, ready to insert.
/// Same shape as [`Transaction`] minus the row identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub order_id: String,
    pub payment_id: String,
    pub checkout_uid: String,
    pub entity_uid: String,
    pub entity_name: String,

    pub parent: bool,
    pub operation_type: String,
    pub childs: String,

    pub status_code: i64,
    pub status_message: String,
    pub description: String,

    pub source_name: String,
    pub source_type: String,
    pub source_reference: String,
    pub source_number: String,
    pub source_expiration: String,
    pub source_installment: String,
    pub installment_name: String,
    pub installment_amount: f64,
    pub installment_count: i64,
    pub source_url: String,
    pub cardholder: String,
    pub customer: String,

    pub total: f64,
    pub currency: String,
    pub risk_analysis: i64,

    pub data: String,
    pub created: String,
    pub updated: String,
}

/// Installment plan detail parsed from the `source_installment` blob.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallmentDetail {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub amount: f64,
}

impl Transaction {
    /// Parse the serialized installment detail, if any.
    pub fn installment(&self) -> Option<InstallmentDetail> {
        serde_json::from_str(&self.source_installment).ok()
    }

    /// Parse the serialized cardholder object, if any.
    pub fn cardholder_detail(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.cardholder).ok()
    }

    /// Parse the serialized child payment references.
    pub fn child_payments(&self) -> Vec<serde_json::Value> {
        serde_json::from_str(&self.childs).unwrap_or_default()
    }

    /// Parse the full original payload retained for audit.
    pub fn payload(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.data).ok()
    }
}
