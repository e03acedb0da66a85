use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{MoneypitError, Result};
use crate::models::{
    Category, CategoryGuess, InputFileRecord, LedgerRow, MatchRule, UncategorizedTxn,
};
use crate::parsers::SourceBank;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Insert a category (names are stored lowercase) and return its id. Inserting
/// an existing name returns the existing id.
pub fn create_category(conn: &Connection, name: &str) -> Result<i64> {
    let name = name.trim().to_lowercase();
    conn.execute(
        "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
        params![name],
    )?;
    let id = conn.query_row(
        "SELECT id FROM categories WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn get_category_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let row = conn
        .query_row(
            "SELECT id, name FROM categories WHERE name = ?1",
            params![name.trim().to_lowercase()],
            |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Match rules (learned memo -> category associations)
// ---------------------------------------------------------------------------

pub fn create_match_rule(conn: &Connection, category_id: i64, match_text: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO match_rules (category_id, match_text) VALUES (?1, ?2)",
        params![category_id, match_text],
    )?;
    Ok(())
}

/// All stored rules joined to their category, for the Categorizer cache.
pub fn get_memo_category_map(conn: &Connection) -> Result<Vec<(String, CategoryGuess)>> {
    let mut stmt = conn.prepare(
        "SELECT m.match_text, m.category_id, c.name, m.id \
         FROM match_rules m JOIN categories c ON m.category_id = c.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                CategoryGuess {
                    category_id: Some(row.get(1)?),
                    category_name: row.get(2)?,
                    rule_id: Some(row.get(3)?),
                },
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_match_rules(conn: &Connection) -> Result<Vec<MatchRule>> {
    let mut stmt = conn.prepare(
        "SELECT m.id, m.category_id, c.name, m.match_text, m.hit_count \
         FROM match_rules m JOIN categories c ON m.category_id = c.id \
         ORDER BY c.name, m.match_text",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MatchRule {
                id: row.get(0)?,
                category_id: row.get(1)?,
                category_name: row.get(2)?,
                match_text: row.get(3)?,
                hit_count: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_match_rule(conn: &Connection, rule_id: i64) -> Result<MatchRule> {
    conn.query_row(
        "SELECT m.id, m.category_id, c.name, m.match_text, m.hit_count \
         FROM match_rules m JOIN categories c ON m.category_id = c.id WHERE m.id = ?1",
        params![rule_id],
        |row| {
            Ok(MatchRule {
                id: row.get(0)?,
                category_id: row.get(1)?,
                category_name: row.get(2)?,
                match_text: row.get(3)?,
                hit_count: row.get(4)?,
            })
        },
    )
    .optional()?
    .ok_or(MoneypitError::UnknownRule(rule_id))
}

pub fn record_rule_hit(conn: &Connection, rule_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE match_rules SET hit_count = hit_count + 1 WHERE id = ?1",
        params![rule_id],
    )?;
    Ok(())
}

pub fn reassign_match_rule(conn: &Connection, rule_id: i64, category_id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE match_rules SET category_id = ?1 WHERE id = ?2",
        params![category_id, rule_id],
    )?;
    if changed == 0 {
        return Err(MoneypitError::UnknownRule(rule_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Input files
// ---------------------------------------------------------------------------

/// Insert-or-ignore keyed on (source bank, filename); re-registering a known
/// file is a no-op.
pub fn register_input_file(
    conn: &Connection,
    bank: SourceBank,
    filename: &str,
    created_at: i64,
    created_at_human: &str,
    checksum: &str,
) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO input_files \
         (source_bank_id, filename, created_at, created_at_human, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![bank.id(), filename, created_at, created_at_human, checksum],
    )?;
    Ok(())
}

/// Id and success timestamp for a registered file.
pub fn get_input_file_status(
    conn: &Connection,
    bank: SourceBank,
    filename: &str,
) -> Result<(i64, Option<i64>)> {
    let row = conn.query_row(
        "SELECT id, processed_success_at FROM input_files \
         WHERE source_bank_id = ?1 AND filename = ?2",
        params![bank.id(), filename],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(row)
}

/// Stamp the success timestamp. Written last, after every line has been
/// persisted.
pub fn mark_file_processed(conn: &Connection, file_id: i64, timestamp: i64) -> Result<()> {
    conn.execute(
        "UPDATE input_files SET processed_success_at = ?1 WHERE id = ?2",
        params![timestamp, file_id],
    )?;
    Ok(())
}

pub fn list_input_files(conn: &Connection) -> Result<Vec<InputFileRecord>> {
    let mut stmt = conn.prepare(
        "SELECT f.id, b.name, f.filename, f.created_at_human, f.processed_success_at, f.checksum, \
                (SELECT count(*) FROM transactions t WHERE t.input_file_id = f.id) \
         FROM input_files f JOIN source_banks b ON f.source_bank_id = b.id \
         ORDER BY f.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(InputFileRecord {
                id: row.get(0)?,
                bank_name: row.get(1)?,
                filename: row.get(2)?,
                created_at_human: row.get(3)?,
                processed_success_at: row.get(4)?,
                checksum: row.get(5)?,
                transaction_count: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Physically remove a file and every transaction it produced. Irreversible
/// administrative operation, distinct from per-transaction soft delete.
pub fn cascade_delete_file(conn: &Connection, file_id: i64) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM transactions WHERE input_file_id = ?1",
        params![file_id],
    )?;
    let files = conn.execute("DELETE FROM input_files WHERE id = ?1", params![file_id])?;
    if files == 0 {
        return Err(MoneypitError::UnknownFile(file_id));
    }
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

pub struct NewTransaction<'a> {
    pub amount: f64,
    pub date_human: &'a str,
    pub date_timestamp: i64,
    pub memo_raw: &'a str,
    pub input_file_id: i64,
    pub source_bank_id: i64,
}

/// Insert-or-ignore on the dedup key (amount, dates, raw memo, source bank).
/// Returns true when a row was actually written. Duplicates are the designed
/// de-duplication path, not an error.
pub fn insert_transaction_if_absent(conn: &Connection, txn: &NewTransaction) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO transactions \
         (amount, date_human, date_timestamp, memo_raw, input_file_id, source_bank_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            txn.amount,
            txn.date_human,
            txn.date_timestamp,
            txn.memo_raw,
            txn.input_file_id,
            txn.source_bank_id
        ],
    )?;
    Ok(inserted > 0)
}

pub fn list_uncategorized(conn: &Connection) -> Result<Vec<UncategorizedTxn>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.amount, t.date_human, t.memo_raw, b.name \
         FROM transactions t JOIN source_banks b ON t.source_bank_id = b.id \
         WHERE t.category_id IS NULL AND t.deleted_at IS NULL \
         ORDER BY t.date_timestamp, t.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(UncategorizedTxn {
                id: row.get(0)?,
                amount: row.get(1)?,
                date_human: row.get(2)?,
                memo_raw: row.get(3)?,
                bank_name: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn set_transaction_category(conn: &Connection, txn_id: i64, category_id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE transactions SET category_id = ?1 WHERE id = ?2",
        params![category_id, txn_id],
    )?;
    if changed == 0 {
        return Err(MoneypitError::UnknownTransaction(txn_id));
    }
    Ok(())
}

/// User override of the display text; the raw memo stays untouched as the
/// dedup/matching key.
pub fn set_transaction_memo(conn: &Connection, txn_id: i64, memo: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE transactions SET memo_custom = ?1 WHERE id = ?2",
        params![memo, txn_id],
    )?;
    if changed == 0 {
        return Err(MoneypitError::UnknownTransaction(txn_id));
    }
    Ok(())
}

pub fn soft_delete_transaction(conn: &Connection, txn_id: i64, timestamp: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE transactions SET deleted_at = ?1 WHERE id = ?2",
        params![timestamp, txn_id],
    )?;
    if changed == 0 {
        return Err(MoneypitError::UnknownTransaction(txn_id));
    }
    Ok(())
}

/// Non-deleted raw memos, for backfilling after a rule reassignment.
pub fn transactions_for_backfill(conn: &Connection) -> Result<Vec<(i64, String)>> {
    let mut stmt =
        conn.prepare("SELECT id, memo_raw FROM transactions WHERE deleted_at IS NULL")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The full non-deleted ledger, oldest first, for export and listings.
pub fn ledger_rows(conn: &Connection) -> Result<Vec<LedgerRow>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.date_human, t.amount, coalesce(t.memo_custom, t.memo_raw), c.name, b.name \
         FROM transactions t \
         JOIN source_banks b ON t.source_bank_id = b.id \
         LEFT JOIN categories c ON t.category_id = c.id \
         WHERE t.deleted_at IS NULL \
         ORDER BY t.date_timestamp, t.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(LedgerRow {
                id: row.get(0)?,
                date_human: row.get(1)?,
                amount: row.get(2)?,
                memo: row.get(3)?,
                category: row.get(4)?,
                bank_name: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
