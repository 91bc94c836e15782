use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::mapping;
use crate::settings::{db_path, load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    let conn = get_connection(&db_path(&resolved))?;
    init_db(&conn)?;

    mapping::ensure_initialized(&mapping::mapping_path(&resolved))?;

    println!("Initialized silo at {}", resolved.display());
    Ok(())
}
