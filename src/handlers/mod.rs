mod capture;
mod health;
mod return_url;
mod webhook;

pub use capture::capture_order;
pub use health::health;
pub use return_url::mobbex_return;
pub use webhook::mobbex_webhook;

use axum::routing::{get, post};
use axum::Router;

use crate::db::AppState;

/// Build the relay's route table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mobbex/v1/webhook", post(mobbex_webhook))
        .route("/mobbex/v1/return", get(mobbex_return))
        .route("/mobbex/v1/orders/:id/capture", post(capture_order))
        .with_state(state)
}
