//! Side-channel notification for processed webhooks.
//!
//! When `FORWARD_WEBHOOK_URL` is configured, the relay posts an event with
//! the order id and the decoded gateway payload after each parent delivery
//! is reconciled. This is the extension point for external subscribers
//! (accounting, analytics); failures never affect the webhook response.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use reqwest::Client;
use serde::Serialize;

/// Retry delays in milliseconds. Quick retries only; the event is
/// best-effort and must not hold resources for long.
const FORWARD_RETRY_DELAYS: &[u64] = &[100, 200];

/// Event emitted after a parent webhook is fully reconciled.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookProcessedEvent {
    pub order_id: String,
    /// Decoded original gateway payload.
    pub payload: serde_json::Value,
    /// Unix timestamp of reconciliation.
    pub timestamp: i64,
}

/// Spawn a fire-and-forget forward of a processed-webhook event.
///
/// No-op when no URL is configured. Panics in the spawned task are logged
/// rather than silently swallowed.
pub fn spawn_webhook_event(client: Client, url: Option<String>, event: WebhookProcessedEvent) {
    if let Some(url) = url {
        let order_id = event.order_id.clone();
        tokio::spawn(
            AssertUnwindSafe(async move {
                send_event(&client, &url, &event).await;
            })
            .catch_unwind()
            .map(move |result| {
                if let Err(panic) = result {
                    let panic_msg = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::error!(
                        "Forward task panicked for order '{}': {}",
                        order_id,
                        panic_msg
                    );
                }
            }),
        );
    }
}

async fn send_event<T: Serialize>(client: &Client, url: &str, event: &T) {
    for (attempt, delay_ms) in std::iter::once(&0u64)
        .chain(FORWARD_RETRY_DELAYS.iter())
        .enumerate()
    {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }

        match client
            .post(url)
            .json(event)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                if attempt > 0 {
                    tracing::debug!("Forward webhook succeeded after {} retries", attempt);
                }
                return;
            }
            Ok(resp) => {
                tracing::debug!("Forward webhook returned {}", resp.status());
            }
            Err(e) => {
                tracing::debug!("Forward webhook failed: {}", e);
            }
        }
    }

    tracing::warn!(
        "Forward webhook failed after {} attempts",
        FORWARD_RETRY_DELAYS.len() + 1
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delays_are_quick() {
        let total_delay: u64 = FORWARD_RETRY_DELAYS.iter().sum();
        assert!(total_delay < 500, "Retry delays should be quick");
    }

    #[test]
    fn test_event_serialization() {
        let event = WebhookProcessedEvent {
            order_id: "55".to_string(),
            payload: serde_json::json!({ "payment": { "id": "OP-1" } }),
            timestamp: 1234567890,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"order_id\":\"55\""));
        assert!(json.contains("\"OP-1\""));
    }
}
