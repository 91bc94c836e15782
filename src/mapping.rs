use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

type Result<T> = std::result::Result<T, ExportError>;

/// Revenue/tax account groupings. Informational: kept in the document
/// for the accounting side, never consulted when building the export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountMappings {
    #[serde(default)]
    pub revenue_accounts: BTreeMap<String, String>,
    #[serde(default)]
    pub tax_accounts: BTreeMap<String, String>,
}

/// The Sage GLS mapping document. `category_mappings` is the operative
/// part: charge category name → ledger account code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SageMapping {
    #[serde(default)]
    pub account_mappings: AccountMappings,
    #[serde(default)]
    pub category_mappings: BTreeMap<String, String>,
}

impl Default for SageMapping {
    fn default() -> Self {
        Self {
            account_mappings: AccountMappings {
                revenue_accounts: map(&[
                    ("rental_income", "4000"),
                    ("late_fees", "4010"),
                    ("administrative_fees", "4020"),
                ]),
                tax_accounts: map(&[("sales_tax", "2200"), ("county_tax", "2210")]),
            },
            category_mappings: map(&[
                ("Rent", "4000"),
                ("Late Fee", "4010"),
                ("Admin Fee", "4020"),
                ("Insurance", "4030"),
            ]),
        }
    }
}

impl SageMapping {
    /// Ledger account for a category, falling back to the account code
    /// carried by the source row when the category is unmapped.
    pub fn account_for<'a>(&'a self, category: &str, fallback: &'a str) -> &'a str {
        self.category_mappings
            .get(category)
            .map(|s| s.as_str())
            .unwrap_or(fallback)
    }
}

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn mapping_path(data_dir: &Path) -> PathBuf {
    data_dir.join("sage_gls_mapping.json")
}

/// Write the default document if none exists. An existing file is never
/// touched, so hand edits survive restarts.
pub fn ensure_initialized(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&SageMapping::default())
        .map_err(|e| ExportError::Mapping(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn load(path: &Path) -> Result<SageMapping> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ExportError::Mapping(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| ExportError::Mapping(format!("cannot parse {}: {e}", path.display())))
}
