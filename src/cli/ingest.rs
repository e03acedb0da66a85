use std::path::Path;

use colored::Colorize;
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::Result;
use crate::ingest::{self, IngestOutcome};
use crate::settings;

pub fn run(path: &str) -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let path = Path::new(path);

    if path.is_dir() {
        let reports = ingest::ingest_dir(&conn, path)?;
        if reports.is_empty() {
            println!("{}", "No csv files found.".yellow());
            return Ok(());
        }
        let mut failed = 0;
        for report in reports {
            match report.outcome {
                Ok(outcome) => print_outcome(&report.filename, &outcome),
                Err(e) => {
                    failed += 1;
                    println!("{} {}: {e}", "Failed".red(), report.filename);
                }
            }
        }
        if failed > 0 {
            println!("{}", format!("{failed} file(s) failed.").red());
        }
        return Ok(());
    }

    ingest_single(&conn, path)
}

fn ingest_single(conn: &Connection, path: &Path) -> Result<()> {
    let outcome = ingest::ingest_file(conn, path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    print_outcome(filename, &outcome);
    Ok(())
}

fn print_outcome(filename: &str, outcome: &IngestOutcome) {
    if outcome.already_processed {
        println!(
            "{} {filename} was already processed, skipping.",
            "Skipped.".yellow()
        );
        return;
    }
    println!(
        "{} {filename} ({}): {} new, {} duplicate",
        "Done.".green(),
        outcome.bank.name(),
        outcome.inserted,
        outcome.duplicates
    );
}
