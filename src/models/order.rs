use serde::{Deserialize, Serialize};

/// Order lifecycle states the reconciliation engine can move an order to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    OnHold,
    Processing,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::OnHold => "on-hold",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "on-hold" => Some(Self::OnHold),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An order owned by the local store. The webhook pipeline only mutates
/// existing orders looked up by id; it never creates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub total: f64,
    pub currency: String,
    pub payment_method_title: Option<String>,

    /// Guard against applying the fee/discount adjustment twice.
    pub total_adjusted: bool,
    pub paid_at: Option<i64>,
    /// Gateway payment id recorded when the order was marked paid.
    pub payment_reference: Option<String>,

    // Webhook metadata, last-delivery-wins.
    pub webhook_data: Option<String>,
    pub payment_id: Option<String>,
    pub coupon_url: Option<String>,
    pub card_info: Option<String>,
    pub plan: Option<String>,
    pub risk_analysis: Option<i64>,

    pub created_at: i64,
    pub updated_at: i64,
}

/// Data required to create an order (seeding and tests; webhooks never
/// create orders).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub id: String,
    pub total: f64,
    pub currency: String,
}

/// Free-text note attached to an order. Append-only.
#[derive(Debug, Clone, Serialize)]
pub struct OrderNote {
    pub id: i64,
    pub order_id: String,
    pub note: String,
    pub created_at: i64,
}

/// Synthetic fee or discount line added when the notified total differs
/// from the order total. Positive amount = surcharge, negative = discount.
#[derive(Debug, Clone, Serialize)]
pub struct OrderFee {
    pub id: i64,
    pub order_id: String,
    pub name: String,
    pub amount: f64,
    pub created_at: i64,
}
