//! Test utilities and fixtures for relay integration tests

#![allow(dead_code)]

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::sync::Arc;

pub use mobbex_relay::config::{Config, DEFAULT_API_URL, DEFAULT_COUPON_URL};
pub use mobbex_relay::db::{init_db, queries, AppState};
pub use mobbex_relay::handlers;
pub use mobbex_relay::models::*;
pub use mobbex_relay::token::TokenAuthenticator;
pub use mobbex_relay::webhook::{
    ReconciliationEngine, WebhookDelivery, WebhookError, WebhookOutcome,
};

/// Fixed credential pair used across tests.
pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

pub fn test_authenticator() -> TokenAuthenticator {
    TokenAuthenticator::new(TEST_API_KEY, TEST_ACCESS_TOKEN)
}

/// The token the gateway would present for the test credentials.
pub fn valid_token() -> String {
    test_authenticator().generate()
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create a test order seeded the way the surrounding shop would
pub fn create_test_order(conn: &Connection, id: &str, total: f64) -> Order {
    let input = CreateOrder {
        id: id.to_string(),
        total,
        currency: "ARS".to_string(),
    };
    queries::create_order(conn, &input).expect("Failed to create test order")
}

/// Engine wired with the test credentials and no forward URL, so parent
/// deliveries need no async runtime.
pub fn test_engine() -> ReconciliationEngine {
    ReconciliationEngine::new(
        test_authenticator(),
        DEFAULT_COUPON_URL.to_string(),
        reqwest::Client::new(),
        None,
    )
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        database_path: ":memory:".to_string(),
        enabled: true,
        api_key: TEST_API_KEY.to_string(),
        access_token: TEST_ACCESS_TOKEN.to_string(),
        api_url: DEFAULT_API_URL.to_string(),
        coupon_url: DEFAULT_COUPON_URL.to_string(),
        order_received_url: "/order-received/{order_id}".to_string(),
        cart_url: "/cart".to_string(),
        forward_webhook_url: None,
    }
}

/// Create an AppState for testing with an in-memory database.
/// A single pooled connection keeps every handler on the same database.
pub fn create_test_app_state() -> AppState {
    create_test_app_state_with_config(test_config())
}

pub fn create_test_app_state_with_config(config: Config) -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    let engine = Arc::new(ReconciliationEngine::new(
        TokenAuthenticator::new(config.api_key.clone(), config.access_token.clone()),
        config.coupon_url.clone(),
        reqwest::Client::new(),
        None,
    ));

    AppState {
        db: pool,
        config,
        engine,
        http_client: reqwest::Client::new(),
    }
}

/// An approved card payment notification, the common happy-path payload.
pub fn approved_card_payload(payment_id: &str, total: f64) -> Value {
    json!({
        "payment": {
            "id": payment_id,
            "description": "Orden #55",
            "operation": { "type": "payment.v2" },
            "status": { "code": 200, "message": "Aprobado" },
            "total": total,
            "created": "2024-05-01T10:00:00Z",
            "updated": "2024-05-01T10:05:00Z",
            "source": {
                "name": "Visa",
                "type": "card",
                "number": "4242 **** 4242",
                "installment": { "description": "Ahora 3", "count": 3, "amount": total / 3.0 }
            }
        },
        "checkout": { "uid": "chk-1", "currency": "ARS" },
        "entity": { "uid": "ent-1", "name": "Mi Tienda" }
    })
}

/// A minimal payload with an explicit status code and total.
pub fn payload_with(payment_id: &str, status_code: i64, total: f64) -> Value {
    json!({
        "payment": {
            "id": payment_id,
            "status": { "code": status_code, "message": "" },
            "total": total,
            "source": { "name": "Mobbex", "type": "other" }
        },
        "entity": { "uid": "ent-1" }
    })
}

pub fn delivery(order_id: &str, token: &str, payload: Value) -> WebhookDelivery {
    WebhookDelivery {
        order_id: order_id.to_string(),
        token: token.to_string(),
        payload,
    }
}

pub fn count_transactions(conn: &Connection, order_id: &str) -> usize {
    queries::list_transactions_for_order(conn, order_id)
        .expect("Failed to list transactions")
        .len()
}

pub fn order(conn: &Connection, id: &str) -> Order {
    queries::get_order(conn, id)
        .expect("Failed to query order")
        .expect("Order should exist")
}

pub fn notes(conn: &Connection, order_id: &str) -> Vec<String> {
    queries::list_order_notes(conn, order_id)
        .expect("Failed to list notes")
        .into_iter()
        .map(|n| n.note)
        .collect()
}

pub fn fees(conn: &Connection, order_id: &str) -> Vec<OrderFee> {
    queries::list_order_fees(conn, order_id).expect("Failed to list fees")
}
