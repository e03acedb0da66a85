use comfy_table::{presets::UTF8_FULL, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::settings;
use crate::store;

pub fn list() -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let categories = store::list_categories(&conn)?;
    if categories.is_empty() {
        println!("No categories yet. They are created while categorizing.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Name"]);
    for category in categories {
        table.add_row(vec![category.id.to_string(), category.name]);
    }
    println!("{table}");
    Ok(())
}
