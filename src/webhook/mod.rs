//! Webhook reconciliation pipeline.
//!
//! `normalizer` flattens the gateway payload, `status` maps gateway codes to
//! order lifecycle states, and `engine` orchestrates authentication,
//! persistence, and idempotent order mutation.

pub mod engine;
pub mod normalizer;
pub mod status;

pub use engine::{ReconciliationEngine, WebhookDelivery, WebhookError, WebhookOutcome};
pub use normalizer::normalize;
pub use status::{is_approved, map_status, VOID_STATUS_CODE};
