use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::reports::financial_summary;
use crate::settings::{db_path, get_data_dir};

pub fn run(month: Option<&str>, year: Option<i32>) -> Result<()> {
    let month = match month {
        Some(m) => Some(super::parse_month(m)?),
        None => None,
    };
    let conn = get_connection(&db_path(&get_data_dir()))?;
    let rows = financial_summary(&conn, month, year)?;

    if rows.is_empty() {
        println!("No data available. Import some reports first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Period", "Category", "Account", "Charges", "Payments", "Credits", "Net",
        "Count", "Disabled",
    ]);
    for r in &rows {
        table.add_row(vec![
            Cell::new(format!("{}/{}", r.report_month.code(), r.report_year)),
            Cell::new(&r.charge_category),
            Cell::new(&r.account_code),
            Cell::new(money(r.total_charges)),
            Cell::new(money(r.total_payments)),
            Cell::new(money(r.total_credits)),
            Cell::new(money(r.net_total)),
            Cell::new(r.transaction_count),
            Cell::new(r.disabled_charges),
        ]);
    }
    println!("Financial summary by month and category\n{table}");
    Ok(())
}
