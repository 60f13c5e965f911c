//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const ORDER_COLS: &str = "id, status, total, currency, payment_method_title, total_adjusted, \
     paid_at, payment_reference, webhook_data, payment_id, coupon_url, card_info, plan, \
     risk_analysis, created_at, updated_at";

pub const ORDER_NOTE_COLS: &str = "id, order_id, note, created_at";

pub const ORDER_FEE_COLS: &str = "id, order_id, name, amount, created_at";

pub const TRANSACTION_COLS: &str = "id, order_id, payment_id, checkout_uid, entity_uid, \
     entity_name, parent, operation_type, childs, status_code, status_message, description, \
     source_name, source_type, source_reference, source_number, source_expiration, \
     source_installment, installment_name, installment_amount, installment_count, source_url, \
     cardholder, customer, total, currency, risk_analysis, data, created, updated, created_at";

// ============ FromRow Implementations ============

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: String = row.get(1)?;
        Ok(Order {
            id: row.get(0)?,
            status: OrderStatus::from_str(&status).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    1,
                    "status".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?,
            total: row.get(2)?,
            currency: row.get(3)?,
            payment_method_title: row.get(4)?,
            total_adjusted: row.get(5)?,
            paid_at: row.get(6)?,
            payment_reference: row.get(7)?,
            webhook_data: row.get(8)?,
            payment_id: row.get(9)?,
            coupon_url: row.get(10)?,
            card_info: row.get(11)?,
            plan: row.get(12)?,
            risk_analysis: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }
}

impl FromRow for OrderNote {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(OrderNote {
            id: row.get(0)?,
            order_id: row.get(1)?,
            note: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl FromRow for OrderFee {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(OrderFee {
            id: row.get(0)?,
            order_id: row.get(1)?,
            name: row.get(2)?,
            amount: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl FromRow for Transaction {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Transaction {
            id: row.get(0)?,
            order_id: row.get(1)?,
            payment_id: row.get(2)?,
            checkout_uid: row.get(3)?,
            entity_uid: row.get(4)?,
            entity_name: row.get(5)?,
            parent: row.get(6)?,
            operation_type: row.get(7)?,
            childs: row.get(8)?,
            status_code: row.get(9)?,
            status_message: row.get(10)?,
            description: row.get(11)?,
            source_name: row.get(12)?,
            source_type: row.get(13)?,
            source_reference: row.get(14)?,
            source_number: row.get(15)?,
            source_expiration: row.get(16)?,
            source_installment: row.get(17)?,
            installment_name: row.get(18)?,
            installment_amount: row.get(19)?,
            installment_count: row.get(20)?,
            source_url: row.get(21)?,
            cardholder: row.get(22)?,
            customer: row.get(23)?,
            total: row.get(24)?,
            currency: row.get(25)?,
            risk_analysis: row.get(26)?,
            data: row.get(27)?,
            created: row.get(28)?,
            updated: row.get(29)?,
            created_at: row.get(30)?,
        })
    }
}
