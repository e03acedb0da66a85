use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS source_banks (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    UNIQUE(name)
);

CREATE TABLE IF NOT EXISTS input_files (
    id INTEGER PRIMARY KEY,
    source_bank_id INTEGER NOT NULL,
    filename TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    created_at_human TEXT NOT NULL,
    processed_success_at INTEGER,
    checksum TEXT,
    UNIQUE(source_bank_id, filename),
    FOREIGN KEY (source_bank_id) REFERENCES source_banks(id)
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    UNIQUE(name)
);

CREATE TABLE IF NOT EXISTS match_rules (
    id INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL,
    match_text TEXT NOT NULL,
    hit_count INTEGER DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    UNIQUE(category_id, match_text),
    FOREIGN KEY (category_id) REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    amount REAL NOT NULL,
    date_human TEXT NOT NULL,
    date_timestamp INTEGER NOT NULL,
    memo_raw TEXT NOT NULL,
    memo_custom TEXT,
    category_id INTEGER,
    input_file_id INTEGER NOT NULL,
    source_bank_id INTEGER NOT NULL,
    deleted_at INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    UNIQUE(amount, date_human, date_timestamp, memo_raw, source_bank_id),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (input_file_id) REFERENCES input_files(id),
    FOREIGN KEY (source_bank_id) REFERENCES source_banks(id)
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    // Fixed issuer set, seeded once. Ids are stable so re-running init is a
    // no-op for existing databases.
    for bank in crate::parsers::SourceBank::ALL {
        conn.execute(
            "INSERT OR IGNORE INTO source_banks (id, name) VALUES (?1, ?2)",
            rusqlite::params![bank.id(), bank.name()],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["source_banks", "input_files", "categories", "match_rules", "transactions"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT count(*) FROM source_banks", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_init_db_seeds_source_banks() {
        let (_dir, conn) = test_db();
        let names: Vec<String> = conn
            .prepare("SELECT name FROM source_banks ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(names, vec!["Chase", "CapitalOne", "Barclays", "AmericanExpress"]);
    }

    #[test]
    fn test_transaction_dedup_key_is_per_bank() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO input_files (source_bank_id, filename, created_at, created_at_human) \
             VALUES (1, 'chase.csv', 0, '2023-01-01'), (3, 'barclays.csv', 0, '2023-01-01')",
            [],
        )
        .unwrap();
        let insert = "INSERT OR IGNORE INTO transactions \
             (amount, date_human, date_timestamp, memo_raw, input_file_id, source_bank_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
        // Same tuple from two banks: two rows.
        conn.execute(insert, rusqlite::params![-9.99, "2023-01-02", 1672617600, "COFFEE", 1, 1]).unwrap();
        conn.execute(insert, rusqlite::params![-9.99, "2023-01-02", 1672617600, "COFFEE", 2, 3]).unwrap();
        // Same tuple again from the first bank, different file: ignored.
        conn.execute(insert, rusqlite::params![-9.99, "2023-01-02", 1672617600, "COFFEE", 2, 1]).unwrap();
        let count: i64 = conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
