pub mod export;
pub mod import;
pub mod init;
pub mod mapping;
pub mod records;
pub mod status;
pub mod summary;

use clap::{Parser, Subcommand};

use crate::error::{IngestError, Result};
use crate::models::{Period, ReportMonth};

pub(crate) fn parse_month(month: &str) -> Result<ReportMonth> {
    ReportMonth::parse(month)
        .ok_or_else(|| IngestError::InvalidMonth(month.to_string()).into())
}

pub(crate) fn parse_period(month: &str, year: i32) -> Result<Period> {
    let month = parse_month(month)?;
    if year <= 0 {
        return Err(IngestError::InvalidYear(year.to_string()).into());
    }
    Ok(Period::new(month, year))
}

#[derive(Parser)]
#[command(
    name = "silo",
    about = "Monthly income report pipeline for self-storage facilities."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up silo: choose a data directory, initialize the database and mapping.
    Init {
        /// Path for silo data (default: ~/Documents/silo)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a monthly income report spreadsheet for one period.
    Import {
        /// Path to the CSV or XLSX report
        file: String,
        /// Report month: 1-12
        #[arg(long)]
        month: String,
        /// Report year, e.g. 2024
        #[arg(long)]
        year: i32,
    },
    /// List stored transaction records.
    Records,
    /// Show the financial summary by month, category, and account.
    Summary {
        /// Restrict to a report month: 1-12
        #[arg(long)]
        month: Option<String>,
        /// Restrict to a report year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Build the Sage GLS export file for one period.
    Export {
        /// Report month: 1-12
        #[arg(long)]
        month: String,
        /// Report year, e.g. 2024
        #[arg(long)]
        year: i32,
        /// Output path (default: <data_dir>/exports/sage_export_MM_YYYY.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show the category to ledger account mapping.
    Mapping,
    /// Show the current database and import statistics.
    Status,
}
