use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::models::{Period, TransactionRecord};

type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug)]
pub struct StoreOutcome {
    pub stored: usize,
    pub disabled: usize,
}

const INSERT_SQL: &str = "INSERT INTO transactions (
    report_month, report_year, uploaded_at,
    site_id, charge_desc_id, charge_category, charge_desc,
    default_account_code, account_code,
    price, charge, discount,
    charge_tax1, charge_tax2, charge_total,
    payment, payment_tax1, payment_tax2, payment_total,
    credit, credit_tax1, credit_tax2, credit_total,
    total_cost, item_count, discount_percent,
    disabled, deleted
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
          ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)";

/// Replace the period's transactions with `records` and rebuild its
/// summary row, all inside one transaction. On any failure the store is
/// left exactly as it was, so re-running an import is idempotent.
///
/// An empty `records` set is a valid import: the period is cleared and
/// its summary rewritten as all zeros.
pub fn store_period(
    conn: &mut Connection,
    period: Period,
    records: &[TransactionRecord],
) -> Result<StoreOutcome> {
    for r in records {
        if r.report_month != period.month || r.report_year != period.year {
            return Err(StoreError::MixedPeriods {
                expected: period.to_string(),
                found: r.period().to_string(),
            });
        }
    }

    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM transactions WHERE report_month = ?1 AND report_year = ?2",
        params![period.month, period.year],
    )?;
    {
        let mut stmt = tx.prepare_cached(INSERT_SQL)?;
        for r in records {
            stmt.execute(params![
                r.report_month,
                r.report_year,
                r.uploaded_at,
                r.site_id,
                r.charge_desc_id,
                r.charge_category,
                r.charge_desc,
                r.default_account_code,
                r.account_code,
                r.price,
                r.charge,
                r.discount,
                r.charge_tax1,
                r.charge_tax2,
                r.charge_total,
                r.payment,
                r.payment_tax1,
                r.payment_tax2,
                r.payment_total,
                r.credit,
                r.credit_tax1,
                r.credit_tax2,
                r.credit_total,
                r.total_cost,
                r.item_count,
                r.discount_percent,
                r.disabled,
                r.deleted,
            ])?;
        }
    }
    rebuild_summary(&tx, period)?;
    tx.commit()?;

    Ok(StoreOutcome {
        stored: records.len(),
        disabled: records.iter().filter(|r| r.disabled).count(),
    })
}

/// Recompute the monthly_summary row for `period` from the transactions
/// currently in the store. Callers run this inside the same transaction
/// that changed the period's rows.
fn rebuild_summary(conn: &Connection, period: Period) -> Result<()> {
    conn.execute(
        "DELETE FROM monthly_summary WHERE report_month = ?1 AND report_year = ?2",
        params![period.month, period.year],
    )?;

    let (charges, payments, credits, net, count): (f64, f64, f64, f64, i64) = conn.query_row(
        "SELECT COALESCE(SUM(charge_total), 0), COALESCE(SUM(payment_total), 0), \
                COALESCE(SUM(credit_total), 0), COALESCE(SUM(total_cost), 0), COUNT(*) \
         FROM transactions WHERE report_month = ?1 AND report_year = ?2",
        params![period.month, period.year],
        |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        },
    )?;

    conn.execute(
        "INSERT INTO monthly_summary \
         (report_month, report_year, total_charges, total_payments, total_credits, \
          net_total, record_count, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            period.month,
            period.year,
            charges,
            payments,
            credits,
            net,
            count,
            chrono::Local::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Append an audit row for a completed import. Informational only.
pub fn log_import(
    conn: &Connection,
    filename: &str,
    period: Period,
    record_count: usize,
    checksum: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO imports (filename, report_month, report_year, record_count, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            filename,
            period.month,
            period.year,
            record_count as i64,
            checksum
        ],
    )?;
    Ok(())
}

/// Convenience for the import path: strip the directory from a source path.
pub fn source_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}
