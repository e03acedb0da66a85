use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::categorizer::Categorizer;
use crate::db::get_connection;
use crate::error::{MoneypitError, Result};
use crate::settings;
use crate::store;

pub fn list() -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let rules = store::list_match_rules(&conn)?;
    if rules.is_empty() {
        println!("No rules yet. They are learned while categorizing.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Matches", "Category", "Hits"]);
    for rule in rules {
        table.add_row(vec![
            rule.id.to_string(),
            rule.match_text,
            rule.category_name,
            rule.hit_count.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Point a rule at a different (existing) category and recategorize every
/// transaction the rule matches.
pub fn reassign(rule_id: i64, category_name: &str) -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let category = store::get_category_by_name(&conn, category_name)?
        .ok_or(MoneypitError::UnknownCategory)?;

    let mut categorizer = Categorizer::new(&conn);
    let updated = categorizer.reassign_rule(rule_id, category.id)?;
    println!(
        "{} Rule {rule_id} now maps to '{}'; {updated} transaction(s) updated.",
        "Done.".green(),
        category.name
    );
    Ok(())
}
