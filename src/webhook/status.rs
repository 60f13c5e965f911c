//! Gateway status code to order lifecycle state mapping.
//!
//! Bucket membership is configuration, not logic: the tables below mirror
//! the codes the gateway documents for each outcome. Payment completion is
//! keyed on membership of the approved bucket, never on the mapped label.

use crate::models::OrderStatus;

/// Codes signaling a fully approved payment.
pub const APPROVED_CODES: &[i64] = &[200, 210, 300, 301, 302, 303];

/// Codes for operations held for manual or risk review.
pub const ON_HOLD_CODES: &[i64] = &[2, 3, 100, 201];

/// Codes for operations still awaiting payment.
pub const PENDING_CODES: &[i64] = &[0, 1];

/// Codes for rejected or failed operations.
pub const REJECTED_CODES: &[i64] = &[400, 402, 500, 600, 602, 610];

/// Codes for refunded or reversed operations.
pub const REFUNDED_CODES: &[i64] = &[601, 603, 604, 605, 606, 607, 608, 609];

/// Codes for expired checkouts.
pub const EXPIRED_CODES: &[i64] = &[401];

/// The gateway's void code. Total adjustment is skipped for this code.
pub const VOID_STATUS_CODE: i64 = 605;

/// Map a gateway status code to the order lifecycle state it implies.
/// Unknown codes are treated as failures.
pub fn map_status(code: i64) -> OrderStatus {
    if APPROVED_CODES.contains(&code) {
        OrderStatus::Processing
    } else if ON_HOLD_CODES.contains(&code) {
        OrderStatus::OnHold
    } else if PENDING_CODES.contains(&code) {
        OrderStatus::Pending
    } else if REFUNDED_CODES.contains(&code) {
        OrderStatus::Refunded
    } else if EXPIRED_CODES.contains(&code) {
        OrderStatus::Cancelled
    } else {
        OrderStatus::Failed
    }
}

/// Whether a code belongs to the approved bucket. This is the sole trigger
/// for marking an order paid.
pub fn is_approved(code: i64) -> bool {
    APPROVED_CODES.contains(&code)
}
