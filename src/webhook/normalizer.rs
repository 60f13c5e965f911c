//! Flattens a gateway notification into a fixed-shape transaction record.
//!
//! The gateway payload is arbitrarily nested and sparsely populated; every
//! recognized field is pulled into a flat record with empty-string (or zero)
//! sentinels for anything absent, so the persisted shape never varies.
//! Nested detail that is only kept for audit (expiration, installment,
//! cardholder, url, customer, child references, the payload itself) is
//! serialized to a JSON string rather than decomposed.

use serde_json::Value;

use crate::models::NewTransaction;

/// Prefix marking a child/split payment notification.
pub const CHILD_PAYMENT_PREFIX: &str = "CHD-";

/// A payment id marks a parent (top-level) transaction unless it carries
/// the child prefix.
pub fn is_parent_payment(payment_id: &str) -> bool {
    !payment_id.starts_with(CHILD_PAYMENT_PREFIX)
}

fn str_at(payload: &Value, pointer: &str) -> String {
    match payload.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn str_at_or(payload: &Value, pointer: &str, default: &str) -> String {
    let s = str_at(payload, pointer);
    if s.is_empty() {
        default.to_string()
    } else {
        s
    }
}

/// Serialize a nested value to its JSON string form, empty string if absent.
fn json_at(payload: &Value, pointer: &str) -> String {
    payload
        .pointer(pointer)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

fn i64_at(payload: &Value, pointer: &str) -> i64 {
    match payload.pointer(pointer) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        // The gateway occasionally sends numeric fields as strings.
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

fn f64_at(payload: &Value, pointer: &str) -> f64 {
    match payload.pointer(pointer) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Normalize a webhook payload into a transaction record. Infallible:
/// absent fields take their sentinel defaults.
pub fn normalize(order_id: &str, payload: &Value) -> NewTransaction {
    let payment_id = str_at(payload, "/payment/id");

    NewTransaction {
        order_id: order_id.to_string(),
        // Records without a payment id can never drive order mutation.
        parent: !payment_id.is_empty() && is_parent_payment(&payment_id),
        payment_id,
        checkout_uid: str_at(payload, "/checkout/uid"),
        entity_uid: str_at(payload, "/entity/uid"),
        entity_name: str_at(payload, "/entity/name"),

        operation_type: str_at(payload, "/payment/operation/type"),
        childs: json_at(payload, "/childs"),

        status_code: i64_at(payload, "/payment/status/code"),
        status_message: str_at(payload, "/payment/status/message"),
        description: str_at(payload, "/payment/description"),

        source_name: str_at_or(payload, "/payment/source/name", "Mobbex"),
        source_type: str_at_or(payload, "/payment/source/type", "Mobbex"),
        source_reference: str_at(payload, "/payment/source/reference"),
        source_number: str_at(payload, "/payment/source/number"),
        source_expiration: json_at(payload, "/payment/source/expiration"),
        source_installment: json_at(payload, "/payment/source/installment"),
        installment_name: str_at(payload, "/payment/source/installment/description"),
        installment_amount: f64_at(payload, "/payment/source/installment/amount"),
        installment_count: i64_at(payload, "/payment/source/installment/count"),
        source_url: json_at(payload, "/payment/source/url"),
        cardholder: json_at(payload, "/payment/source/cardholder"),
        customer: json_at(payload, "/customer"),

        total: f64_at(payload, "/payment/total"),
        currency: str_at(payload, "/checkout/currency"),
        risk_analysis: i64_at(payload, "/payment/riskAnalysis/level"),

        data: payload.to_string(),
        created: str_at(payload, "/payment/created"),
        updated: str_at(payload, "/payment/updated"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parent_classification() {
        assert!(is_parent_payment("ABC-123"));
        assert!(!is_parent_payment("CHD-ABC-123"));
        // Prefix must be at the start
        assert!(is_parent_payment("XCHD-123"));
    }

    #[test]
    fn test_empty_payload_takes_sentinels() {
        let record = normalize("55", &json!({}));

        assert_eq!(record.order_id, "55");
        assert!(!record.parent);
        assert_eq!(record.payment_id, "");
        assert_eq!(record.status_code, 0);
        assert_eq!(record.source_name, "Mobbex");
        assert_eq!(record.source_type, "Mobbex");
        assert_eq!(record.source_installment, "");
        assert_eq!(record.total, 0.0);
        assert_eq!(record.risk_analysis, 0);
        assert_eq!(record.data, "{}");
    }

    #[test]
    fn test_full_payload_flattening() {
        let payload = json!({
            "payment": {
                "id": "OP-99",
                "description": "Orden #55",
                "operation": { "type": "payment.v2" },
                "status": { "code": 200, "message": "Aprobado" },
                "total": 1500.5,
                "riskAnalysis": { "level": 3 },
                "created": "2024-05-01T10:00:00Z",
                "updated": "2024-05-01T10:05:00Z",
                "source": {
                    "name": "Visa",
                    "type": "card",
                    "reference": "visa",
                    "number": "4242 **** 4242",
                    "expiration": { "month": "12", "year": "2030" },
                    "installment": { "description": "3 cuotas", "count": 3, "amount": 500.17 },
                    "url": ["https://example.test/receipt"],
                    "cardholder": { "name": "JUAN PEREZ" }
                }
            },
            "checkout": { "uid": "chk-1", "currency": "ARS" },
            "entity": { "uid": "ent-1", "name": "Mi Tienda" },
            "customer": { "email": "juan@example.test" },
            "childs": [{ "id": "CHD-OP-99" }]
        });

        let record = normalize("55", &payload);

        assert!(record.parent);
        assert_eq!(record.payment_id, "OP-99");
        assert_eq!(record.status_code, 200);
        assert_eq!(record.status_message, "Aprobado");
        assert_eq!(record.source_name, "Visa");
        assert_eq!(record.source_type, "card");
        assert_eq!(record.installment_name, "3 cuotas");
        assert_eq!(record.installment_count, 3);
        assert_eq!(record.installment_amount, 500.17);
        assert_eq!(record.total, 1500.5);
        assert_eq!(record.currency, "ARS");
        assert_eq!(record.risk_analysis, 3);
        assert_eq!(record.entity_uid, "ent-1");
        assert_eq!(record.checkout_uid, "chk-1");
        assert_eq!(record.created, "2024-05-01T10:00:00Z");
        assert_eq!(record.updated, "2024-05-01T10:05:00Z");

        // Nested detail serialized, not decomposed
        assert!(record.source_expiration.contains("\"month\""));
        assert!(record.cardholder.contains("JUAN PEREZ"));
        assert!(record.childs.contains("CHD-OP-99"));

        // Full payload retained for audit
        let decoded: serde_json::Value = serde_json::from_str(&record.data).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_numeric_fields_accept_string_form() {
        let payload = json!({
            "payment": {
                "id": "OP-1",
                "status": { "code": "300" },
                "total": "250.75"
            }
        });

        let record = normalize("1", &payload);
        assert_eq!(record.status_code, 300);
        assert_eq!(record.total, 250.75);
    }

    #[test]
    fn test_child_payment_classified() {
        let payload = json!({ "payment": { "id": "CHD-OP-99" } });
        let record = normalize("55", &payload);
        assert!(!record.parent);
    }
}
