use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    report_month TEXT NOT NULL,
    report_year INTEGER NOT NULL,
    uploaded_at TEXT NOT NULL,
    site_id TEXT NOT NULL DEFAULT '',
    charge_desc_id TEXT NOT NULL DEFAULT '',
    charge_category TEXT NOT NULL DEFAULT '',
    charge_desc TEXT NOT NULL DEFAULT '',
    default_account_code TEXT NOT NULL DEFAULT '',
    account_code TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL DEFAULT 0,
    charge REAL NOT NULL DEFAULT 0,
    discount REAL NOT NULL DEFAULT 0,
    charge_tax1 REAL NOT NULL DEFAULT 0,
    charge_tax2 REAL NOT NULL DEFAULT 0,
    charge_total REAL NOT NULL DEFAULT 0,
    payment REAL NOT NULL DEFAULT 0,
    payment_tax1 REAL NOT NULL DEFAULT 0,
    payment_tax2 REAL NOT NULL DEFAULT 0,
    payment_total REAL NOT NULL DEFAULT 0,
    credit REAL NOT NULL DEFAULT 0,
    credit_tax1 REAL NOT NULL DEFAULT 0,
    credit_tax2 REAL NOT NULL DEFAULT 0,
    credit_total REAL NOT NULL DEFAULT 0,
    total_cost REAL NOT NULL DEFAULT 0,
    item_count INTEGER NOT NULL DEFAULT 0,
    discount_percent REAL NOT NULL DEFAULT 0,
    disabled INTEGER NOT NULL DEFAULT 0,
    deleted INTEGER NOT NULL DEFAULT 0,
    UNIQUE(report_month, report_year, site_id, charge_desc_id, charge_category, charge_desc)
);

CREATE TABLE IF NOT EXISTS monthly_summary (
    id INTEGER PRIMARY KEY,
    report_month TEXT NOT NULL,
    report_year INTEGER NOT NULL,
    total_charges REAL NOT NULL DEFAULT 0,
    total_payments REAL NOT NULL DEFAULT 0,
    total_credits REAL NOT NULL DEFAULT 0,
    net_total REAL NOT NULL DEFAULT 0,
    record_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    UNIQUE(report_month, report_year)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    report_month TEXT NOT NULL,
    report_year INTEGER NOT NULL,
    record_count INTEGER,
    checksum TEXT,
    imported_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    migrate_db(conn);
    Ok(())
}

/// Add columns introduced after the first release to stores created
/// before them. Additive only; a failure here must not block normal
/// operation, so problems go to stderr and we keep going.
pub fn migrate_db(conn: &Connection) {
    for (column, ddl) in [
        (
            "disabled",
            "ALTER TABLE transactions ADD COLUMN disabled INTEGER NOT NULL DEFAULT 0",
        ),
        (
            "deleted",
            "ALTER TABLE transactions ADD COLUMN deleted INTEGER NOT NULL DEFAULT 0",
        ),
    ] {
        match table_has_column(conn, "transactions", column) {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = conn.execute(ddl, []) {
                    eprintln!("Warning: could not add column '{column}': {e}");
                }
            }
            Err(e) => eprintln!("Warning: could not inspect schema: {e}"),
        }
    }
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
