use std::collections::HashMap;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::IngestError;
use crate::models::{Period, TransactionRecord};

type Result<T> = std::result::Result<T, IngestError>;

/// Columns that identify a charge line. A file whose header row has none
/// of these is not a facility income report and is rejected outright;
/// any other absent column is synthesized as zero / empty.
const IDENTIFYING_COLUMNS: &[&str] = &[
    "SiteID",
    "ChargeDescID",
    "ChargeCategory",
    "ChargeDescription",
];

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Tolerant numeric parse: strips thousands separators, quotes and
/// currency symbols, honors parenthesized negatives. Anything that still
/// fails to parse coerces to 0 — measures are never missing or NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -inner.trim().parse::<f64>().unwrap_or(0.0);
    }
    s.parse().unwrap_or(0.0)
}

fn coerce_flag(raw: &str) -> bool {
    coerce_number(raw) != 0.0
}

// ---------------------------------------------------------------------------
// Header reconciliation
// ---------------------------------------------------------------------------

/// Case-insensitive header-name → column-index lookup built from the
/// first row of the source file.
struct HeaderMap(HashMap<String, usize>);

impl HeaderMap {
    fn new(names: &[String]) -> Self {
        let mut map = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            map.entry(name.trim().to_ascii_lowercase()).or_insert(i);
        }
        Self(map)
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.0.get(&name.to_ascii_lowercase()).copied()
    }

    fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.index(n).is_some())
    }
}

fn build_record(
    headers: &HeaderMap,
    cells: &[String],
    period: Period,
    uploaded_at: &str,
) -> TransactionRecord {
    let text = |name: &str| -> String {
        headers
            .index(name)
            .and_then(|i| cells.get(i))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };
    let num = |name: &str| coerce_number(&text(name));

    TransactionRecord {
        id: None,
        report_month: period.month,
        report_year: period.year,
        uploaded_at: uploaded_at.to_string(),
        site_id: text("SiteID"),
        charge_desc_id: text("ChargeDescID"),
        charge_category: text("ChargeCategory"),
        charge_desc: text("ChargeDescription"),
        default_account_code: text("DefaultAccountCode"),
        account_code: text("AccountCode"),
        price: num("Price"),
        charge: num("Charge"),
        discount: num("Discount"),
        charge_tax1: num("ChargeTax1"),
        charge_tax2: num("ChargeTax2"),
        charge_total: num("ChargeTotal"),
        payment: num("Payment"),
        payment_tax1: num("PaymentTax1"),
        payment_tax2: num("PaymentTax2"),
        payment_total: num("PaymentTotal"),
        credit: num("Credit"),
        credit_tax1: num("CreditTax1"),
        credit_tax2: num("CreditTax2"),
        credit_total: num("CreditTotal"),
        total_cost: num("TotalCost"),
        item_count: num("ItemCount") as i64,
        discount_percent: num("DiscountPercent"),
        disabled: coerce_flag(&text("Disabled")),
        deleted: coerce_flag(&text("Deleted")),
    }
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<(HeaderMap, Vec<Vec<String>>)> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let names: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let headers = HeaderMap::new(&names);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok((headers, rows))
}

#[cfg(feature = "xlsx")]
fn read_workbook(path: &Path) -> Result<(HeaderMap, Vec<Vec<String>>)> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| IngestError::Workbook(format!("cannot open workbook: {e}")))?;
    // The report lives on the first sheet.
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::Workbook("workbook has no sheets".to_string()))?
        .map_err(|e| IngestError::Workbook(e.to_string()))?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter
        .next()
        .ok_or_else(|| IngestError::Workbook("worksheet is empty".to_string()))?;
    let names: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let headers = HeaderMap::new(&names);

    let mut rows = Vec::new();
    for row in rows_iter {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(cells);
    }
    Ok((headers, rows))
}

#[cfg(feature = "xlsx")]
fn cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// ingest
// ---------------------------------------------------------------------------

/// Read a monthly income report and normalize it into transaction
/// records stamped with `period` and a single ingestion timestamp.
/// All-or-nothing: any read failure fails the whole call.
pub fn ingest(path: &Path, period: Period) -> Result<Vec<TransactionRecord>> {
    if period.year <= 0 {
        return Err(IngestError::InvalidYear(period.year.to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let (headers, rows) = match ext.as_str() {
        "csv" => read_csv(path)?,
        #[cfg(feature = "xlsx")]
        "xlsx" | "xls" | "xlsm" => read_workbook(path)?,
        _ => return Err(IngestError::UnsupportedFormat(path.display().to_string())),
    };

    if !headers.has_any(IDENTIFYING_COLUMNS) {
        return Err(IngestError::Unrecognized(path.display().to_string()));
    }

    let uploaded_at = chrono::Local::now().to_rfc3339();
    Ok(rows
        .iter()
        .map(|cells| build_record(&headers, cells, period, &uploaded_at))
        .collect())
}

/// SHA-256 hex digest of the source file, recorded in the import audit log.
pub fn file_checksum(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportMonth;

    fn period() -> Period {
        Period::new(ReportMonth::March, 2024)
    }

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("1,234.56"), 1234.56);
        assert_eq!(coerce_number("\"500.00\""), 500.0);
        assert_eq!(coerce_number("  -42.50  "), -42.5);
        assert_eq!(coerce_number("$1,234.56"), 1234.56);
        assert_eq!(coerce_number("(75.00)"), -75.0);
        assert_eq!(coerce_number("0"), 0.0);
    }

    #[test]
    fn test_coerce_number_garbage_becomes_zero() {
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("   "), 0.0);
        assert_eq!(coerce_number("N/A"), 0.0);
    }

    #[test]
    fn test_ingest_csv_basic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "report.csv",
            "SiteID,ChargeCategory,ChargeDescription,AccountCode,ChargeTotal,PaymentTotal,Disabled\n\
             S001,Rent,Unit rent,4000,100.50,-100.50,0\n\
             S001,Late Fee,Late charge,4010,25.00,0,1\n",
        );
        let records = ingest(&path, period()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].site_id, "S001");
        assert_eq!(records[0].charge_category, "Rent");
        assert_eq!(records[0].charge_total, 100.5);
        assert_eq!(records[0].payment_total, -100.5);
        assert!(!records[0].disabled);
        assert!(records[1].disabled);
    }

    #[test]
    fn test_ingest_stamps_period_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "report.csv",
            "SiteID,ChargeCategory,ChargeTotal\nS001,Rent,10\nS002,Rent,20\n",
        );
        let records = ingest(&path, period()).unwrap();
        assert!(records
            .iter()
            .all(|r| r.report_month == ReportMonth::March && r.report_year == 2024));
        assert!(!records[0].uploaded_at.is_empty());
        // One wall-clock read per import call.
        assert_eq!(records[0].uploaded_at, records[1].uploaded_at);
    }

    #[test]
    fn test_ingest_missing_columns_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "report.csv",
            "SiteID,ChargeCategory\nS001,Rent\n",
        );
        let records = ingest(&path, period()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.charge_total, 0.0);
        assert_eq!(r.payment_total, 0.0);
        assert_eq!(r.item_count, 0);
        assert_eq!(r.account_code, "");
        assert!(!r.disabled);
        assert!(!r.deleted);
    }

    #[test]
    fn test_ingest_non_numeric_cells_coerce_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "report.csv",
            "SiteID,ChargeCategory,ChargeTotal,PaymentTotal\nS001,Rent,abc,\n",
        );
        let records = ingest(&path, period()).unwrap();
        assert_eq!(records[0].charge_total, 0.0);
        assert_eq!(records[0].payment_total, 0.0);
    }

    #[test]
    fn test_ingest_headers_match_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "report.csv",
            "siteid,chargecategory,chargetotal\nS001,Rent,12.5\n",
        );
        let records = ingest(&path, period()).unwrap();
        assert_eq!(records[0].site_id, "S001");
        assert_eq!(records[0].charge_total, 12.5);
    }

    #[test]
    fn test_ingest_ignores_extra_columns_and_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "report.csv",
            "SiteID,ChargeCategory,ChargeTotal,SomethingElse\nS001,Rent,10,zzz\n,,,\n",
        );
        let records = ingest(&path, period()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_ingest_rejects_unrecognizable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "report.csv",
            "Animal,Sound\ncow,moo\n",
        );
        let err = ingest(&path, period()).unwrap_err();
        assert!(matches!(err, IngestError::Unrecognized(_)), "got: {err}");
    }

    #[test]
    fn test_ingest_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, "not a spreadsheet").unwrap();
        let err = ingest(&path, period()).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)), "got: {err}");
    }

    #[test]
    fn test_ingest_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ingest(&dir.path().join("nope.csv"), period()).unwrap_err();
        assert!(matches!(err, IngestError::Io(_)), "got: {err}");
    }

    #[test]
    fn test_ingest_rejects_non_positive_year() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "report.csv", "SiteID\nS001\n");
        let err = ingest(&path, Period::new(ReportMonth::March, 0)).unwrap_err();
        assert!(matches!(err, IngestError::InvalidYear(_)), "got: {err}");
    }

    #[test]
    fn test_file_checksum_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "report.csv", "SiteID\nS001\n");
        let a = file_checksum(&path).unwrap();
        let b = file_checksum(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
