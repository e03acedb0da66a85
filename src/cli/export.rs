use std::io::Write;

use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::settings;
use crate::store;

/// Write the non-deleted ledger as CSV, oldest first. Custom memos win over
/// raw ones, uncategorized rows get an empty category column.
pub fn run(output: Option<&str>) -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let rows = store::ledger_rows(&conn)?;

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            write_csv(file, &rows)?;
            println!(
                "{} {} transaction(s) exported to {path}.",
                "Done.".green(),
                rows.len()
            );
        }
        None => {
            let stdout = std::io::stdout();
            write_csv(stdout.lock(), &rows)?;
        }
    }
    Ok(())
}

fn write_csv<W: Write>(writer: W, rows: &[crate::models::LedgerRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["date", "amount", "memo", "category", "source_bank"])?;
    for row in rows {
        let amount = format!("{:.2}", row.amount);
        csv_writer.write_record([
            row.date_human.as_str(),
            amount.as_str(),
            row.memo.as_str(),
            row.category.as_deref().unwrap_or(""),
            row.bank_name.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
