use std::fmt;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::Serialize;

/// Reporting month, stored as its two-digit code ("01".."12") so that
/// lexical ordering in SQL matches calendar ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportMonth {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

pub const ALL_MONTHS: [ReportMonth; 12] = [
    ReportMonth::January,
    ReportMonth::February,
    ReportMonth::March,
    ReportMonth::April,
    ReportMonth::May,
    ReportMonth::June,
    ReportMonth::July,
    ReportMonth::August,
    ReportMonth::September,
    ReportMonth::October,
    ReportMonth::November,
    ReportMonth::December,
];

impl ReportMonth {
    pub fn code(&self) -> &'static str {
        match self {
            Self::January => "01",
            Self::February => "02",
            Self::March => "03",
            Self::April => "04",
            Self::May => "05",
            Self::June => "06",
            Self::July => "07",
            Self::August => "08",
            Self::September => "09",
            Self::October => "10",
            Self::November => "11",
            Self::December => "12",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }

    /// Accepts "1".."12" with or without a leading zero.
    pub fn parse(s: &str) -> Option<Self> {
        let n: u32 = s.trim().parse().ok()?;
        if n == 0 || n > 12 {
            return None;
        }
        Some(ALL_MONTHS[(n - 1) as usize])
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl ToSql for ReportMonth {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for ReportMonth {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        ReportMonth::parse(s).ok_or(FromSqlError::InvalidType)
    }
}

/// One monthly import batch: (report_month, report_year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub month: ReportMonth,
    pub year: i32,
}

impl Period {
    pub fn new(month: ReportMonth, year: i32) -> Self {
        Self { month, year }
    }

    /// Reference string used in ledger entries, e.g. "03-2024".
    pub fn reference(&self) -> String {
        format!("{}-{}", self.month.code(), self.year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month.code(), self.year)
    }
}

/// One charge/payment/credit line for a site in a reporting period.
/// `id` is None until the record has been stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: Option<i64>,
    pub report_month: ReportMonth,
    pub report_year: i32,
    pub uploaded_at: String,
    pub site_id: String,
    pub charge_desc_id: String,
    pub charge_category: String,
    pub charge_desc: String,
    pub default_account_code: String,
    pub account_code: String,
    pub price: f64,
    pub charge: f64,
    pub discount: f64,
    pub charge_tax1: f64,
    pub charge_tax2: f64,
    pub charge_total: f64,
    pub payment: f64,
    pub payment_tax1: f64,
    pub payment_tax2: f64,
    pub payment_total: f64,
    pub credit: f64,
    pub credit_tax1: f64,
    pub credit_tax2: f64,
    pub credit_total: f64,
    pub total_cost: f64,
    pub item_count: i64,
    pub discount_percent: f64,
    pub disabled: bool,
    pub deleted: bool,
}

impl TransactionRecord {
    pub fn period(&self) -> Period {
        Period::new(self.report_month, self.report_year)
    }
}

/// One grouped line of the financial summary: (month, year, category,
/// account code) with aggregate totals.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub report_month: ReportMonth,
    pub report_year: i32,
    pub charge_category: String,
    pub account_code: String,
    pub total_charges: f64,
    pub total_payments: f64,
    pub total_credits: f64,
    pub net_total: f64,
    pub transaction_count: i64,
    pub disabled_charges: i64,
}

/// Export-ready projection row: non-disabled transactions grouped by
/// (category, account code, default account code).
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub charge_category: String,
    pub account_code: String,
    pub default_account_code: String,
    pub debit_amount: f64,
    pub credit_amount: f64,
}

/// Stored per-period rollup from the monthly_summary table.
#[derive(Debug, Clone)]
pub struct MonthlySummary {
    pub report_month: ReportMonth,
    pub report_year: i32,
    pub total_charges: f64,
    pub total_payments: f64,
    pub total_credits: f64,
    pub net_total: f64,
    pub record_count: i64,
    pub created_at: String,
}

/// One debit or credit line destined for the Sage GLS import file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Debit")]
    pub debit: f64,
    #[serde(rename = "Credit")]
    pub credit: f64,
    #[serde(rename = "Reference")]
    pub reference: String,
}
