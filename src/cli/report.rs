use chrono::{Datelike, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{self, money};
use crate::reports;
use crate::settings;

/// Default slice: Jan 1 of the current year through today.
fn resolve_range(from: Option<&str>, to: Option<&str>) -> Result<(i64, i64)> {
    let from_date = match from {
        Some(d) => d.to_string(),
        None => format!("{}-01-01", Utc::now().year()),
    };
    let to_date = match to {
        Some(d) => d.to_string(),
        None => fmt::today_string(),
    };
    Ok((
        fmt::timestamp_from_date(&from_date)?,
        fmt::timestamp_from_date(&to_date)?,
    ))
}

pub fn heatmap(from: Option<&str>, to: Option<&str>) -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let (from_ts, to_ts) = resolve_range(from, to)?;
    let matrix = reports::spending_matrix(&conn, from_ts, to_ts)?;

    if matrix.is_empty() {
        println!("No categorized spending in that range.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut header = vec![Cell::new("Category")];
    header.extend(matrix.months.iter().map(Cell::new));
    header.push(Cell::new("Total"));
    table.set_header(header);

    for category in &matrix.categories {
        let mut row = vec![Cell::new(category)];
        for month in &matrix.months {
            let amount = matrix.total(category, month);
            row.push(if amount == 0.0 {
                Cell::new("")
            } else {
                Cell::new(money(amount))
            });
        }
        row.push(Cell::new(money(matrix.category_total(category))));
        table.add_row(row);
    }

    let mut footer = vec![Cell::new("All")];
    let mut grand_total = 0.0;
    for month in &matrix.months {
        let amount = matrix.month_total(month);
        grand_total += amount;
        footer.push(Cell::new(money(amount)));
    }
    footer.push(Cell::new(money(grand_total)));
    table.add_row(footer);

    println!("{table}");
    Ok(())
}

pub fn transactions(from: Option<&str>, to: Option<&str>, category: Option<&str>) -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let (from_ts, to_ts) = resolve_range(from, to)?;
    let rows = reports::transactions_in_range(&conn, from_ts, to_ts, category)?;

    if rows.is_empty() {
        println!("No transactions in that range.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Date", "Amount", "Memo", "Category", "Bank"]);
    for row in rows {
        table.add_row(vec![
            row.id.to_string(),
            row.date_human,
            money(row.amount),
            row.memo,
            row.category.unwrap_or_default(),
            row.bank_name,
        ]);
    }
    println!("{table}");
    Ok(())
}
