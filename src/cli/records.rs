use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::reports::all_records;
use crate::settings::{db_path, get_data_dir};

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path(&get_data_dir()))?;
    let records = all_records(&conn)?;

    if records.is_empty() {
        println!("No records stored. Import a report first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Period", "Site", "Category", "Description", "Account", "Charges", "Payments",
        "Credits", "Disabled",
    ]);
    for r in &records {
        table.add_row(vec![
            Cell::new(r.period()),
            Cell::new(&r.site_id),
            Cell::new(&r.charge_category),
            Cell::new(&r.charge_desc),
            Cell::new(&r.account_code),
            Cell::new(money(r.charge_total)),
            Cell::new(money(r.payment_total)),
            Cell::new(money(r.credit_total)),
            Cell::new(if r.disabled { "yes" } else { "" }),
        ]);
    }
    println!("{table}");
    println!("{} records", records.len());
    Ok(())
}
