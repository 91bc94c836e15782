use std::path::PathBuf;

use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::ingest::{file_checksum, ingest};
use crate::reports::monthly_summaries;
use crate::settings::{db_path, get_data_dir};
use crate::store::{log_import, source_filename, store_period};

pub fn run(file: &str, month: &str, year: i32) -> Result<()> {
    let period = super::parse_period(month, year)?;
    let file_path = PathBuf::from(file);
    let mut conn = get_connection(&db_path(&get_data_dir()))?;

    let records = ingest(&file_path, period)?;
    let outcome = store_period(&mut conn, period, &records)?;

    let checksum = file_checksum(&file_path)?;
    log_import(
        &conn,
        &source_filename(&file_path),
        period,
        outcome.stored,
        &checksum,
    )?;

    println!(
        "{}",
        format!("Imported {} records for {period}", outcome.stored).green()
    );
    if outcome.disabled > 0 {
        println!("Disabled charges: {}", outcome.disabled);
    }

    if let Some(s) = monthly_summaries(&conn)?
        .into_iter()
        .find(|s| s.report_month == period.month && s.report_year == period.year)
    {
        println!(
            "{} {}: charges {}, payments {}, credits {}, net {}",
            period.month.name(),
            period.year,
            money(s.total_charges),
            money(s.total_payments),
            money(s.total_credits),
            money(s.net_total)
        );
    }

    Ok(())
}
