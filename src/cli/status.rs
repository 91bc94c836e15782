use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::reports::monthly_summaries;
use crate::settings::{db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db = db_path(&data_dir);

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db.display());

    if !db.exists() {
        println!();
        println!("Database not found. Run `silo init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = get_connection(&db)?;
    let transactions: i64 =
        conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
    let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;

    let summaries = monthly_summaries(&conn)?;
    println!();
    println!("Transactions:  {transactions}");
    println!("Periods:       {}", summaries.len());
    println!("Imports:       {imports}");

    if !summaries.is_empty() {
        println!();
        for s in summaries.iter().take(6) {
            println!(
                "{}/{}: {} records, charges {}, payments {}, net {} (computed {})",
                s.report_month.code(),
                s.report_year,
                s.record_count,
                money(s.total_charges),
                money(s.total_payments),
                money(s.net_total),
                s.created_at
            );
        }
    }

    Ok(())
}
