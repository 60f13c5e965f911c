use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Orders (the local order repository mutated by reconciliation).
        -- Webhooks never insert here; rows are seeded by the surrounding shop.
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'on-hold', 'processing', 'completed',
                                  'failed', 'refunded', 'cancelled')),
            total REAL NOT NULL,
            currency TEXT NOT NULL,
            payment_method_title TEXT,
            total_adjusted INTEGER NOT NULL DEFAULT 0,
            paid_at INTEGER,
            payment_reference TEXT,
            webhook_data TEXT,
            payment_id TEXT,
            coupon_url TEXT,
            card_info TEXT,
            plan TEXT,
            risk_analysis INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Append-only order notes. Duplicate webhook deliveries append
        -- duplicate notes; there is no dedup key.
        CREATE TABLE IF NOT EXISTS order_notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            note TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_order_notes_order ON order_notes(order_id);

        -- Synthetic fee/discount line items added by total adjustment.
        CREATE TABLE IF NOT EXISTS order_fees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_order_fees_order ON order_fees(order_id);

        -- Append-only audit trail of normalized webhook deliveries.
        -- One row per delivery, duplicates by design, rows never updated.
        CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL,
            payment_id TEXT NOT NULL,
            checkout_uid TEXT NOT NULL,
            entity_uid TEXT NOT NULL,
            entity_name TEXT NOT NULL,
            parent INTEGER NOT NULL,
            operation_type TEXT NOT NULL,
            childs TEXT NOT NULL,
            status_code INTEGER NOT NULL,
            status_message TEXT NOT NULL,
            description TEXT NOT NULL,
            source_name TEXT NOT NULL,
            source_type TEXT NOT NULL,
            source_reference TEXT NOT NULL,
            source_number TEXT NOT NULL,
            source_expiration TEXT NOT NULL,
            source_installment TEXT NOT NULL,
            installment_name TEXT NOT NULL,
            installment_amount REAL NOT NULL,
            installment_count INTEGER NOT NULL,
            source_url TEXT NOT NULL,
            cardholder TEXT NOT NULL,
            customer TEXT NOT NULL,
            total REAL NOT NULL,
            currency TEXT NOT NULL,
            risk_analysis INTEGER NOT NULL,
            data TEXT NOT NULL,
            created TEXT NOT NULL,
            updated TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_transactions_order ON transactions(order_id);
        CREATE INDEX IF NOT EXISTS idx_transactions_payment ON transactions(payment_id);
        "#,
    )
}
