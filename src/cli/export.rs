use std::path::PathBuf;

use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::export::{build_export, export_filename, write_ledger_csv};
use crate::mapping;
use crate::settings::{db_path, get_data_dir, shellexpand_path};

pub fn run(month: &str, year: i32, output: Option<&str>) -> Result<()> {
    let period = super::parse_period(month, year)?;
    let data_dir = get_data_dir();
    let conn = get_connection(&db_path(&data_dir))?;

    let mapping_file = mapping::mapping_path(&data_dir);
    mapping::ensure_initialized(&mapping_file)?;
    let mapping = mapping::load(&mapping_file)?;

    let entries = build_export(&conn, &mapping, period)?;
    if entries.is_empty() {
        println!("{}", format!("No data to export for {period}.").yellow());
        return Ok(());
    }

    let out_path = match output {
        Some(p) => PathBuf::from(shellexpand_path(p)),
        None => {
            let exports_dir = data_dir.join("exports");
            std::fs::create_dir_all(&exports_dir)?;
            exports_dir.join(export_filename(period))
        }
    };
    write_ledger_csv(&entries, &out_path)?;

    println!(
        "{}",
        format!(
            "Wrote {} ledger entries to {} (disabled charges excluded)",
            entries.len(),
            out_path.display()
        )
        .green()
    );
    Ok(())
}
