use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{
    query_all, query_one, ORDER_COLS, ORDER_FEE_COLS, ORDER_NOTE_COLS, TRANSACTION_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Transactions (append-only) ============

/// Insert a normalized webhook delivery. Always a fresh row; duplicates of
/// `(order_id, payment_id)` are expected and kept.
pub fn insert_transaction(conn: &Connection, input: &NewTransaction) -> Result<Transaction> {
    let id = gen_id();
    let created_at = now();

    conn.execute(
        &format!(
            "INSERT INTO transactions ({TRANSACTION_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31)"
        ),
        params![
            &id,
            &input.order_id,
            &input.payment_id,
            &input.checkout_uid,
            &input.entity_uid,
            &input.entity_name,
            input.parent,
            &input.operation_type,
            &input.childs,
            input.status_code,
            &input.status_message,
            &input.description,
            &input.source_name,
            &input.source_type,
            &input.source_reference,
            &input.source_number,
            &input.source_expiration,
            &input.source_installment,
            &input.installment_name,
            input.installment_amount,
            input.installment_count,
            &input.source_url,
            &input.cardholder,
            &input.customer,
            input.total,
            &input.currency,
            input.risk_analysis,
            &input.data,
            &input.created,
            &input.updated,
            created_at,
        ],
    )?;

    get_transaction(conn, &id)?.ok_or_else(|| {
        crate::error::AppError::Internal("Transaction not found after insert".into())
    })
}

pub fn get_transaction(conn: &Connection, id: &str) -> Result<Option<Transaction>> {
    query_one(
        conn,
        &format!("SELECT {TRANSACTION_COLS} FROM transactions WHERE id = ?1"),
        &[&id],
    )
}

pub fn list_transactions_for_order(conn: &Connection, order_id: &str) -> Result<Vec<Transaction>> {
    query_all(
        conn,
        &format!(
            "SELECT {TRANSACTION_COLS} FROM transactions
             WHERE order_id = ?1 ORDER BY created_at, id"
        ),
        &[&order_id],
    )
}

// ============ Orders ============

/// Create an order. Used by seeding and tests; the webhook pipeline only
/// mutates orders that already exist.
pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let ts = now();

    conn.execute(
        "INSERT INTO orders (id, status, total, currency, created_at, updated_at)
         VALUES (?1, 'pending', ?2, ?3, ?4, ?4)",
        params![&input.id, input.total, &input.currency, ts],
    )?;

    get_order(conn, &input.id)?
        .ok_or_else(|| crate::error::AppError::Internal("Order not found after insert".into()))
}

pub fn get_order(conn: &Connection, id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {ORDER_COLS} FROM orders WHERE id = ?1"),
        &[&id],
    )
}

pub fn update_order_status(conn: &Connection, id: &str, status: OrderStatus) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now(), id],
    )?;
    Ok(affected > 0)
}

/// Overwrite the webhook metadata on an order. Last delivery wins.
pub fn set_order_webhook_meta(
    conn: &Connection,
    id: &str,
    webhook_data: &str,
    payment_id: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET webhook_data = ?1, payment_id = ?2, updated_at = ?3 WHERE id = ?4",
        params![webhook_data, payment_id, now(), id],
    )?;
    Ok(affected > 0)
}

pub fn set_order_coupon_url(conn: &Connection, id: &str, coupon_url: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET coupon_url = ?1, updated_at = ?2 WHERE id = ?3",
        params![coupon_url, now(), id],
    )?;
    Ok(affected > 0)
}

pub fn set_order_card_meta(conn: &Connection, id: &str, card_info: &str, plan: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET card_info = ?1, plan = ?2, updated_at = ?3 WHERE id = ?4",
        params![card_info, plan, now(), id],
    )?;
    Ok(affected > 0)
}

pub fn set_order_risk_analysis(conn: &Connection, id: &str, level: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET risk_analysis = ?1, updated_at = ?2 WHERE id = ?3",
        params![level, now(), id],
    )?;
    Ok(affected > 0)
}

pub fn set_payment_method_title(conn: &Connection, id: &str, title: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET payment_method_title = ?1, updated_at = ?2 WHERE id = ?3",
        params![title, now(), id],
    )?;
    Ok(affected > 0)
}

/// Authoritative total overwrite. Runs on every parent delivery, independent
/// of the fee-line adjustment guard.
pub fn set_order_total(conn: &Connection, id: &str, total: f64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET total = ?1, updated_at = ?2 WHERE id = ?3",
        params![total, now(), id],
    )?;
    Ok(affected > 0)
}

/// Mark the order paid with the gateway payment id as reference.
/// Conditional on `paid_at IS NULL`, so repeat calls are a no-op.
pub fn mark_order_paid(conn: &Connection, id: &str, payment_reference: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET paid_at = ?1, payment_reference = ?2, updated_at = ?1
         WHERE id = ?3 AND paid_at IS NULL",
        params![now(), payment_reference, id],
    )?;
    Ok(affected > 0)
}

/// Add a fee/discount line, fold it into the order total, and set the
/// adjusted flag so a duplicate delivery cannot double-apply it.
pub fn apply_order_fee(conn: &Connection, id: &str, name: &str, amount: f64) -> Result<OrderFee> {
    let ts = now();

    conn.execute(
        "INSERT INTO order_fees (order_id, name, amount, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, amount, ts],
    )?;
    let fee_id = conn.last_insert_rowid();

    conn.execute(
        "UPDATE orders SET total = total + ?1, total_adjusted = 1, updated_at = ?2 WHERE id = ?3",
        params![amount, ts, id],
    )?;

    Ok(OrderFee {
        id: fee_id,
        order_id: id.to_string(),
        name: name.to_string(),
        amount,
        created_at: ts,
    })
}

pub fn list_order_fees(conn: &Connection, order_id: &str) -> Result<Vec<OrderFee>> {
    query_all(
        conn,
        &format!("SELECT {ORDER_FEE_COLS} FROM order_fees WHERE order_id = ?1 ORDER BY id"),
        &[&order_id],
    )
}

// ============ Order Notes ============

pub fn add_order_note(conn: &Connection, order_id: &str, note: &str) -> Result<OrderNote> {
    let ts = now();

    conn.execute(
        "INSERT INTO order_notes (order_id, note, created_at) VALUES (?1, ?2, ?3)",
        params![order_id, note, ts],
    )?;

    Ok(OrderNote {
        id: conn.last_insert_rowid(),
        order_id: order_id.to_string(),
        note: note.to_string(),
        created_at: ts,
    })
}

pub fn list_order_notes(conn: &Connection, order_id: &str) -> Result<Vec<OrderNote>> {
    query_all(
        conn,
        &format!("SELECT {ORDER_NOTE_COLS} FROM order_notes WHERE order_id = ?1 ORDER BY id"),
        &[&order_id],
    )
}
