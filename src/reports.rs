use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, TimeZone, Utc};
use rusqlite::Connection;

use crate::error::Result;
use crate::fmt;
use crate::models::LedgerRow;

/// Category x month spending totals over a time slice. Every month in the
/// range is present even when nothing was spent, so renderers get a full
/// rectangular matrix.
pub struct SpendingMatrix {
    pub months: Vec<String>,
    pub categories: Vec<String>,
    totals: BTreeMap<(String, String), f64>,
}

impl SpendingMatrix {
    pub fn total(&self, category: &str, month: &str) -> f64 {
        self.totals
            .get(&(category.to_string(), month.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn category_total(&self, category: &str) -> f64 {
        self.months.iter().map(|m| self.total(category, m)).sum()
    }

    pub fn month_total(&self, month: &str) -> f64 {
        self.categories.iter().map(|c| self.total(c, month)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Every `%Y-%m` key from the month containing `from_ts` through the month
/// containing `to_ts`, ascending.
fn months_in_range(from_ts: i64, to_ts: i64) -> Vec<String> {
    let (Some(start), Some(end)) = (
        Utc.timestamp_opt(from_ts, 0).single(),
        Utc.timestamp_opt(to_ts, 0).single(),
    ) else {
        return Vec::new();
    };

    let (mut year, mut month) = (start.year(), start.month());
    let (end_year, end_month) = (end.year(), end.month());

    let mut keys = Vec::new();
    while (year, month) <= (end_year, end_month) {
        keys.push(format!("{year:04}-{month:02}"));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    keys
}

/// Aggregate categorized, non-deleted transactions in the slice into the
/// heatmap matrix. Monthly bucketing happens on this side; sqlite has no
/// date type to group on.
pub fn spending_matrix(conn: &Connection, from_ts: i64, to_ts: i64) -> Result<SpendingMatrix> {
    let mut stmt = conn.prepare(
        "SELECT c.name, t.amount, t.date_timestamp \
         FROM transactions t JOIN categories c ON t.category_id = c.id \
         WHERE t.deleted_at IS NULL AND t.date_timestamp BETWEEN ?1 AND ?2",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![from_ts, to_ts], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut totals: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut categories: BTreeSet<String> = BTreeSet::new();
    for (category, amount, timestamp) in rows {
        let key = (category.clone(), fmt::month_key(timestamp));
        *totals.entry(key).or_default() += amount;
        categories.insert(category);
    }

    Ok(SpendingMatrix {
        months: months_in_range(from_ts, to_ts),
        categories: categories.into_iter().collect(),
        totals,
    })
}

/// Non-deleted transactions in the slice, newest first, optionally filtered
/// to one category name. Custom memos take display precedence.
pub fn transactions_in_range(
    conn: &Connection,
    from_ts: i64,
    to_ts: i64,
    category: Option<&str>,
) -> Result<Vec<LedgerRow>> {
    let base = "SELECT t.id, t.date_human, t.amount, coalesce(t.memo_custom, t.memo_raw), \
                c.name, b.name \
                FROM transactions t \
                JOIN source_banks b ON t.source_bank_id = b.id \
                LEFT JOIN categories c ON t.category_id = c.id \
                WHERE t.deleted_at IS NULL AND t.date_timestamp BETWEEN ?1 AND ?2";

    let map_row = |row: &rusqlite::Row<'_>| {
        Ok(LedgerRow {
            id: row.get(0)?,
            date_human: row.get(1)?,
            amount: row.get(2)?,
            memo: row.get(3)?,
            category: row.get(4)?,
            bank_name: row.get(5)?,
        })
    };

    let rows = match category {
        Some(name) => {
            let sql = format!("{base} AND c.name = ?3 ORDER BY t.date_timestamp DESC, t.id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![from_ts, to_ts, name.to_lowercase()], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let sql = format!("{base} ORDER BY t.date_timestamp DESC, t.id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![from_ts, to_ts], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::parsers::SourceBank;
    use crate::store::{self, NewTransaction};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_txn(conn: &Connection, date: &str, memo: &str, amount: f64, category: Option<i64>) -> i64 {
        store::register_input_file(conn, SourceBank::Chase, "chase.csv", 0, "2023-01-01", "x").unwrap();
        let (file_id, _) = store::get_input_file_status(conn, SourceBank::Chase, "chase.csv").unwrap();
        store::insert_transaction_if_absent(
            conn,
            &NewTransaction {
                amount,
                date_human: date,
                date_timestamp: crate::fmt::timestamp_from_date(date).unwrap(),
                memo_raw: memo,
                input_file_id: file_id,
                source_bank_id: SourceBank::Chase.id(),
            },
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        if let Some(cat) = category {
            store::set_transaction_category(conn, id, cat).unwrap();
        }
        id
    }

    #[test]
    fn test_months_in_range_fills_gaps() {
        let from = crate::fmt::timestamp_from_date("2022-11-15").unwrap();
        let to = crate::fmt::timestamp_from_date("2023-02-01").unwrap();
        assert_eq!(
            months_in_range(from, to),
            vec!["2022-11", "2022-12", "2023-01", "2023-02"]
        );
        assert!(months_in_range(to, from).is_empty());
    }

    #[test]
    fn test_spending_matrix_sums_by_category_and_month() {
        let (_dir, conn) = test_db();
        let groceries = store::create_category(&conn, "groceries").unwrap();
        let coffee = store::create_category(&conn, "coffee").unwrap();
        add_txn(&conn, "2023-01-05", "WHOLEFDS A", -50.0, Some(groceries));
        add_txn(&conn, "2023-01-20", "WHOLEFDS B", -25.0, Some(groceries));
        add_txn(&conn, "2023-02-01", "STARBUCKS", -5.0, Some(coffee));
        // Uncategorized rows stay out of the matrix.
        add_txn(&conn, "2023-01-10", "MYSTERY", -99.0, None);

        let from = crate::fmt::timestamp_from_date("2023-01-01").unwrap();
        let to = crate::fmt::timestamp_from_date("2023-03-31").unwrap();
        let matrix = spending_matrix(&conn, from, to).unwrap();

        assert_eq!(matrix.months, vec!["2023-01", "2023-02", "2023-03"]);
        assert_eq!(matrix.categories, vec!["coffee", "groceries"]);
        assert_eq!(matrix.total("groceries", "2023-01"), -75.0);
        assert_eq!(matrix.total("groceries", "2023-02"), 0.0);
        assert_eq!(matrix.total("coffee", "2023-02"), -5.0);
        assert_eq!(matrix.category_total("groceries"), -75.0);
        assert_eq!(matrix.month_total("2023-01"), -75.0);
    }

    #[test]
    fn test_spending_matrix_excludes_soft_deleted() {
        let (_dir, conn) = test_db();
        let coffee = store::create_category(&conn, "coffee").unwrap();
        let txn = add_txn(&conn, "2023-01-05", "STARBUCKS", -5.0, Some(coffee));
        store::soft_delete_transaction(&conn, txn, 999).unwrap();

        let from = crate::fmt::timestamp_from_date("2023-01-01").unwrap();
        let to = crate::fmt::timestamp_from_date("2023-01-31").unwrap();
        let matrix = spending_matrix(&conn, from, to).unwrap();
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_transactions_in_range_newest_first_with_filter() {
        let (_dir, conn) = test_db();
        let coffee = store::create_category(&conn, "coffee").unwrap();
        add_txn(&conn, "2023-01-05", "STARBUCKS", -5.0, Some(coffee));
        add_txn(&conn, "2023-01-20", "DUNKIN", -3.0, Some(coffee));
        add_txn(&conn, "2023-01-10", "MYSTERY", -99.0, None);
        // Outside the slice.
        add_txn(&conn, "2024-06-01", "LATE", -1.0, Some(coffee));

        let from = crate::fmt::timestamp_from_date("2023-01-01").unwrap();
        let to = crate::fmt::timestamp_from_date("2023-01-31").unwrap();

        let all = transactions_in_range(&conn, from, to, None).unwrap();
        let memos: Vec<&str> = all.iter().map(|r| r.memo.as_str()).collect();
        assert_eq!(memos, vec!["DUNKIN", "MYSTERY", "STARBUCKS"]);

        let filtered = transactions_in_range(&conn, from, to, Some("Coffee")).unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.category.as_deref() == Some("coffee")));
    }
}
