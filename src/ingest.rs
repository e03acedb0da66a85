use std::io::{BufRead, BufReader};
use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{MoneypitError, Result};
use crate::fmt;
use crate::parsers::SourceBank;
use crate::store::{self, NewTransaction};

pub struct IngestOutcome {
    pub bank: SourceBank,
    pub inserted: usize,
    pub duplicates: usize,
    pub already_processed: bool,
}

/// Per-file result of a directory pass. Failures are carried, not raised, so
/// one bad statement never blocks the rest of the batch.
pub struct FileReport {
    pub filename: String,
    pub outcome: Result<IngestOutcome>,
}

fn compute_checksum(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Ingest one statement file:
/// resolve the parser from the filename, register the file (insert-or-ignore
/// on bank + filename), skip it when already successfully processed, parse
/// every line into insert-or-ignore transactions, and stamp the success
/// timestamp only after the full pass. Any parse error aborts before the
/// stamp, so a failed file is retried in full on the next run.
pub fn ingest_file(conn: &Connection, path: &Path) -> Result<IngestOutcome> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MoneypitError::UnrecognizedFile(path.display().to_string()))?;
    let bank = SourceBank::from_filename(filename)
        .ok_or_else(|| MoneypitError::UnrecognizedFile(filename.to_string()))?;

    let checksum = compute_checksum(path)?;
    // The file row must exist before any transaction referencing it.
    store::register_input_file(
        conn,
        bank,
        filename,
        fmt::now_timestamp(),
        &fmt::today_string(),
        &checksum,
    )?;
    let (file_id, processed_at) = store::get_input_file_status(conn, bank, filename)?;

    if processed_at.is_some() {
        return Ok(IngestOutcome {
            bank,
            inserted: 0,
            duplicates: 0,
            already_processed: true,
        });
    }

    let (inserted, duplicates) = parse_into_store(conn, path, bank, file_id)?;
    store::mark_file_processed(conn, file_id, fmt::now_timestamp())?;

    Ok(IngestOutcome {
        bank,
        inserted,
        duplicates,
        already_processed: false,
    })
}

fn parse_into_store(
    conn: &Connection,
    path: &Path,
    bank: SourceBank,
    file_id: i64,
) -> Result<(usize, usize)> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut inserted = 0;
    let mut duplicates = 0;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if bank.is_ignored_line(line) {
            continue;
        }

        let parsed = bank.parse_line(line)?;
        let timestamp = fmt::timestamp_from_date(&parsed.date)?;
        let fresh = store::insert_transaction_if_absent(
            conn,
            &NewTransaction {
                amount: parsed.amount,
                date_human: &parsed.date,
                date_timestamp: timestamp,
                memo_raw: &parsed.memo,
                input_file_id: file_id,
                source_bank_id: bank.id(),
            },
        )?;
        if fresh {
            inserted += 1;
        } else {
            duplicates += 1;
        }
    }

    Ok((inserted, duplicates))
}

/// Ingest every `*.csv` in a directory, sorted by name. Each file's failure
/// is isolated into its report.
pub fn ingest_dir(conn: &Connection, dir: &Path) -> Result<Vec<FileReport>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    let mut reports = Vec::new();
    for path in paths {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let outcome = ingest_file(conn, &path);
        reports.push(FileReport { filename, outcome });
    }
    Ok(reports)
}
