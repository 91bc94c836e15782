use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::models::{ExportRow, MonthlySummary, Period, ReportMonth, SummaryRow, TransactionRecord};

type Result<T> = std::result::Result<T, StoreError>;

/// Every stored transaction, in stable insertion order.
pub fn all_records(conn: &Connection) -> Result<Vec<TransactionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, report_month, report_year, uploaded_at, \
                site_id, charge_desc_id, charge_category, charge_desc, \
                default_account_code, account_code, \
                price, charge, discount, \
                charge_tax1, charge_tax2, charge_total, \
                payment, payment_tax1, payment_tax2, payment_total, \
                credit, credit_tax1, credit_tax2, credit_total, \
                total_cost, item_count, discount_percent, \
                disabled, deleted \
         FROM transactions ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(TransactionRecord {
            id: Some(row.get(0)?),
            report_month: row.get(1)?,
            report_year: row.get(2)?,
            uploaded_at: row.get(3)?,
            site_id: row.get(4)?,
            charge_desc_id: row.get(5)?,
            charge_category: row.get(6)?,
            charge_desc: row.get(7)?,
            default_account_code: row.get(8)?,
            account_code: row.get(9)?,
            price: row.get(10)?,
            charge: row.get(11)?,
            discount: row.get(12)?,
            charge_tax1: row.get(13)?,
            charge_tax2: row.get(14)?,
            charge_total: row.get(15)?,
            payment: row.get(16)?,
            payment_tax1: row.get(17)?,
            payment_tax2: row.get(18)?,
            payment_total: row.get(19)?,
            credit: row.get(20)?,
            credit_tax1: row.get(21)?,
            credit_tax2: row.get(22)?,
            credit_total: row.get(23)?,
            total_cost: row.get(24)?,
            item_count: row.get(25)?,
            discount_percent: row.get(26)?,
            disabled: row.get(27)?,
            deleted: row.get(28)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Grouped financial summary by (month, year, category, account code).
/// Filters apply only when the corresponding argument is supplied.
pub fn financial_summary(
    conn: &Connection,
    month: Option<ReportMonth>,
    year: Option<i32>,
) -> Result<Vec<SummaryRow>> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(m) = month {
        conditions.push("report_month = ?");
        values.push(Box::new(m.code().to_string()));
    }
    if let Some(y) = year {
        conditions.push("report_year = ?");
        values.push(Box::new(y));
    }
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT report_month, report_year, charge_category, account_code, \
                SUM(charge_total), SUM(payment_total), SUM(credit_total), SUM(total_cost), \
                COUNT(*), SUM(CASE WHEN disabled = 1 THEN 1 ELSE 0 END) \
         FROM transactions{where_clause} \
         GROUP BY report_month, report_year, charge_category, account_code \
         ORDER BY report_year DESC, report_month DESC, charge_category"
    );
    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        values.iter().map(|v| v.as_ref()).collect();
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok(SummaryRow {
            report_month: row.get(0)?,
            report_year: row.get(1)?,
            charge_category: row.get(2)?,
            account_code: row.get(3)?,
            total_charges: row.get(4)?,
            total_payments: row.get(5)?,
            total_credits: row.get(6)?,
            net_total: row.get(7)?,
            transaction_count: row.get(8)?,
            disabled_charges: row.get(9)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Export-ready projection for one period: non-disabled rows grouped by
/// (category, account code, default account code), with groups summing
/// to zero on both sides dropped.
pub fn export_projection(conn: &Connection, period: Period) -> Result<Vec<ExportRow>> {
    let mut stmt = conn.prepare(
        "SELECT charge_category, account_code, default_account_code, \
                SUM(charge_total) AS debit_amount, SUM(payment_total) AS credit_amount \
         FROM transactions \
         WHERE report_month = ?1 AND report_year = ?2 AND disabled = 0 \
         GROUP BY charge_category, account_code, default_account_code \
         HAVING ABS(debit_amount) + ABS(credit_amount) > 0 \
         ORDER BY charge_category, account_code",
    )?;
    let rows = stmt.query_map(params![period.month, period.year], |row| {
        Ok(ExportRow {
            charge_category: row.get(0)?,
            account_code: row.get(1)?,
            default_account_code: row.get(2)?,
            debit_amount: row.get(3)?,
            credit_amount: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Stored per-period rollups, newest period first.
pub fn monthly_summaries(conn: &Connection) -> Result<Vec<MonthlySummary>> {
    let mut stmt = conn.prepare(
        "SELECT report_month, report_year, total_charges, total_payments, \
                total_credits, net_total, record_count, created_at \
         FROM monthly_summary \
         ORDER BY report_year DESC, report_month DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(MonthlySummary {
            report_month: row.get(0)?,
            report_year: row.get(1)?,
            total_charges: row.get(2)?,
            total_payments: row.get(3)?,
            total_credits: row.get(4)?,
            net_total: row.get(5)?,
            record_count: row.get(6)?,
            created_at: row.get(7)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}
