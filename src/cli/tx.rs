use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt;
use crate::settings;
use crate::store;

pub fn delete(id: i64) -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    store::soft_delete_transaction(&conn, id, fmt::now_timestamp())?;
    println!("{} Transaction {id} hidden from all views.", "Done.".green());
    Ok(())
}

pub fn set_memo(id: i64, memo: &str) -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    store::set_transaction_memo(&conn, id, memo)?;
    println!("{} Transaction {id} now displays as '{memo}'.", "Done.".green());
    Ok(())
}

pub fn set_category(id: i64, category_name: &str) -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let category_id = store::create_category(&conn, category_name)?;
    store::set_transaction_category(&conn, id, category_id)?;
    println!(
        "{} Transaction {id} categorized as '{}'.",
        "Done.".green(),
        category_name.trim().to_lowercase()
    );
    Ok(())
}
