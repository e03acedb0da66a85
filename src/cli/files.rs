use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt;
use crate::settings;
use crate::store;

pub fn list() -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let files = store::list_input_files(&conn)?;
    if files.is_empty() {
        println!("No files ingested yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Bank", "Filename", "Added", "Processed", "Txns", "Checksum"]);
    for file in files {
        let processed = match file.processed_success_at {
            Some(ts) => fmt::format_timestamp(ts),
            None => "never".to_string(),
        };
        let checksum = file
            .checksum
            .as_deref()
            .map(|c| c.chars().take(8).collect::<String>())
            .unwrap_or_default();
        table.add_row(vec![
            file.id.to_string(),
            file.bank_name,
            file.filename,
            file.created_at_human,
            processed,
            file.transaction_count.to_string(),
            checksum,
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Hard delete: the file row and every transaction it produced. Re-ingesting
/// the same file afterwards starts from scratch.
pub fn remove(id: i64) -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let removed = store::cascade_delete_file(&conn, id)?;
    println!(
        "{} File {id} removed along with {removed} transaction(s).",
        "Done.".green()
    );
    Ok(())
}
