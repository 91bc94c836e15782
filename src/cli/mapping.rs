use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::mapping;
use crate::settings::get_data_dir;

pub fn run() -> Result<()> {
    let path = mapping::mapping_path(&get_data_dir());
    mapping::ensure_initialized(&path)?;
    let m = mapping::load(&path)?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Ledger account"]);
    for (category, account) in &m.category_mappings {
        table.add_row(vec![Cell::new(category), Cell::new(account)]);
    }
    println!("Category mappings\n{table}");
    println!(
        "Revenue accounts: {}, tax accounts: {} (informational)",
        m.account_mappings.revenue_accounts.len(),
        m.account_mappings.tax_accounts.len()
    );
    println!("Mapping file: {}", path.display());
    Ok(())
}
