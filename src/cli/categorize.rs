use colored::Colorize;
use dialoguer::{Confirm, Input};

use crate::categorizer::{clean_string, Categorizer, CategoryPrompt};
use crate::db::get_connection;
use crate::error::{MoneypitError, Result};
use crate::fmt::money;
use crate::settings;
use crate::store;

/// Console prompt over dialoguer. The resolution logic itself lives in the
/// categorizer and never touches the terminal.
struct ConsolePrompt;

impl CategoryPrompt for ConsolePrompt {
    fn ask_category(&mut self, known_names: &[String]) -> Result<String> {
        if !known_names.is_empty() {
            println!("Categories on file: {}", known_names.join(", ").dimmed());
        }
        Input::new()
            .with_prompt("No category on file. What should this one be?")
            .interact_text()
            .map_err(|e| MoneypitError::Other(e.to_string()))
    }

    fn confirm_similar(&mut self, suggestion: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(format!("Did you mean '{suggestion}'?"))
            .default(true)
            .interact()
            .map_err(|e| MoneypitError::Other(e.to_string()))
    }
}

pub fn run() -> Result<()> {
    let conn = get_connection(&settings::db_path())?;
    let pending = store::list_uncategorized(&conn)?;
    if pending.is_empty() {
        println!("{}", "Nothing to categorize.".green());
        return Ok(());
    }
    println!("{} transactions need a category.\n", pending.len());

    let mut categorizer = Categorizer::new(&conn);
    let mut prompt = ConsolePrompt;

    for txn in &pending {
        println!(
            "{} on {} via {}: [{}]",
            money(txn.amount).yellow(),
            txn.date_human,
            txn.bank_name,
            txn.memo_raw.bold()
        );
        let cleaned = clean_string(&txn.memo_raw);
        let category_id = categorizer.determine_category_id(&cleaned, &mut prompt)?;
        store::set_transaction_category(&conn, txn.id, category_id)?;
        categorizer.make_note_of_memo_and_category(&cleaned, category_id)?;
    }

    println!("\n{} {} categorized.", "Done.".green(), pending.len());
    Ok(())
}
