use std::path::Path;

use rusqlite::Connection;

use crate::error::ExportError;
use crate::mapping::SageMapping;
use crate::models::{LedgerEntry, Period};
use crate::reports;

type Result<T> = std::result::Result<T, ExportError>;

/// Build the Sage GLS record set for one period. Each projection row
/// yields a debit entry when its debit side is nonzero and a credit
/// entry when its credit side is nonzero — zero, one, or two entries.
/// Amounts carry magnitude only; the side encodes the sign. An empty
/// result means the period has nothing to export.
pub fn build_export(
    conn: &Connection,
    mapping: &SageMapping,
    period: Period,
) -> Result<Vec<LedgerEntry>> {
    let rows = reports::export_projection(conn, period)?;
    let reference = period.reference();

    let mut entries = Vec::new();
    for row in rows {
        // Lenient ingestion can leave account_code blank; the source's
        // default account code is the last resort then.
        let fallback = if row.account_code.is_empty() {
            &row.default_account_code
        } else {
            &row.account_code
        };
        let account = mapping
            .account_for(&row.charge_category, fallback)
            .to_string();
        if row.debit_amount != 0.0 {
            entries.push(LedgerEntry {
                account: account.clone(),
                description: row.charge_category.clone(),
                debit: row.debit_amount.abs(),
                credit: 0.0,
                reference: reference.clone(),
            });
        }
        if row.credit_amount != 0.0 {
            entries.push(LedgerEntry {
                account,
                description: row.charge_category,
                debit: 0.0,
                credit: row.credit_amount.abs(),
                reference: reference.clone(),
            });
        }
    }
    Ok(entries)
}

/// Conventional export filename, e.g. `sage_export_03_2024.csv`.
pub fn export_filename(period: Period) -> String {
    format!("sage_export_{}_{}.csv", period.month.code(), period.year)
}

/// Write entries as delimited text with the header row
/// `Account,Description,Debit,Credit,Reference`.
pub fn write_ledger_csv(entries: &[LedgerEntry], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for entry in entries {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::ReportMonth;
    use rusqlite::params;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn seed(
        conn: &Connection,
        site: &str,
        category: &str,
        account: &str,
        charge_total: f64,
        payment_total: f64,
        disabled: bool,
    ) {
        conn.execute(
            "INSERT INTO transactions \
             (report_month, report_year, uploaded_at, site_id, charge_desc_id, \
              charge_category, charge_desc, default_account_code, account_code, \
              charge_total, payment_total, disabled) \
             VALUES ('03', 2024, 'now', ?1, ?2, ?3, ?4, '9999', ?5, ?6, ?7, ?8)",
            params![
                site,
                format!("{site}-{category}"),
                category,
                format!("{category} line"),
                account,
                charge_total,
                payment_total,
                disabled
            ],
        )
        .unwrap();
    }

    fn march() -> Period {
        Period::new(ReportMonth::March, 2024)
    }

    #[test]
    fn test_build_export_sign_split() {
        let (_dir, conn) = test_db();
        seed(&conn, "S1", "Rent", "4000", 100.0, -40.0, false);

        let entries = build_export(&conn, &SageMapping::default(), march()).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].debit, 100.0);
        assert_eq!(entries[0].credit, 0.0);
        assert_eq!(entries[1].debit, 0.0);
        assert_eq!(entries[1].credit, 40.0);
        for e in &entries {
            assert_eq!(e.account, "4000");
            assert_eq!(e.description, "Rent");
            assert_eq!(e.reference, "03-2024");
        }
    }

    #[test]
    fn test_build_export_single_sided_rows() {
        let (_dir, conn) = test_db();
        seed(&conn, "S1", "Late Fee", "4010", 25.0, 0.0, false);

        let entries = build_export(&conn, &SageMapping::default(), march()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].debit, 25.0);
        assert_eq!(entries[0].credit, 0.0);
    }

    #[test]
    fn test_build_export_unmapped_category_falls_back_to_account_code() {
        let (_dir, conn) = test_db();
        seed(&conn, "S1", "Merchandise", "4550", 12.0, 0.0, false);

        let entries = build_export(&conn, &SageMapping::default(), march()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].account, "4550");
        assert_eq!(entries[0].description, "Merchandise");
    }

    #[test]
    fn test_build_export_blank_account_code_uses_default_account() {
        let (_dir, conn) = test_db();
        seed(&conn, "S1", "Merchandise", "", 12.0, 0.0, false);

        let entries = build_export(&conn, &SageMapping::default(), march()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].account, "9999");
    }

    #[test]
    fn test_build_export_excludes_disabled() {
        let (_dir, conn) = test_db();
        seed(&conn, "S1", "Rent", "4000", 100.0, 0.0, false);
        seed(&conn, "S2", "Rent", "4000", 500.0, -500.0, true);

        let entries = build_export(&conn, &SageMapping::default(), march()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].debit, 100.0);
    }

    #[test]
    fn test_build_export_empty_period() {
        let (_dir, conn) = test_db();
        let entries = build_export(&conn, &SageMapping::default(), march()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_export_filename_convention() {
        assert_eq!(export_filename(march()), "sage_export_03_2024.csv");
        assert_eq!(
            export_filename(Period::new(ReportMonth::November, 2023)),
            "sage_export_11_2023.csv"
        );
    }

    #[test]
    fn test_write_ledger_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let entries = vec![
            LedgerEntry {
                account: "4000".to_string(),
                description: "Rent".to_string(),
                debit: 100.0,
                credit: 0.0,
                reference: "03-2024".to_string(),
            },
            LedgerEntry {
                account: "4010".to_string(),
                description: "Late Fee".to_string(),
                debit: 0.0,
                credit: 40.5,
                reference: "03-2024".to_string(),
            },
        ];
        write_ledger_csv(&entries, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "Account,Description,Debit,Credit,Reference");
        assert_eq!(lines.next().unwrap(), "4000,Rent,100.0,0.0,03-2024");
        assert_eq!(lines.next().unwrap(), "4010,Late Fee,0.0,40.5,03-2024");
    }
}
