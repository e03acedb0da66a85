use colored::Colorize;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{self, Settings, DB_FILENAME};

/// Pick (or keep) the data directory, create it, and bring the database
/// schema up. Safe to run again at any time.
pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = settings::load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = settings::shellexpand_path(&dir);
    }
    apply(&settings)?;
    println!(
        "{} Data directory: {}",
        "Ready.".green(),
        settings.data_dir
    );
    Ok(())
}

fn apply(settings: &Settings) -> Result<()> {
    settings::save_settings(settings)?;
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let conn = get_connection(&data_dir.join(DB_FILENAME))?;
    init_db(&conn)
}
