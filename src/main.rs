mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod ingest;
mod models;
mod parsers;
mod reports;
mod settings;
mod store;

use clap::Parser;
use colored::Colorize;

use cli::{
    CategoriesCommands, Cli, Commands, FilesCommands, ReportCommands, RulesCommands, TxCommands,
};
use error::Result;

fn main() {
    let args = Cli::parse();
    if let Err(e) = dispatch(args) {
        eprintln!("{} {e}", "Error:".red());
        std::process::exit(1);
    }
}

fn dispatch(args: Cli) -> Result<()> {
    match args.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Ingest { path } => cli::ingest::run(&path),
        Commands::Categorize => cli::categorize::run(),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
        },
        Commands::Rules { command } => match command {
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Reassign { rule_id, category } => {
                cli::rules::reassign(rule_id, &category)
            }
        },
        Commands::Files { command } => match command {
            FilesCommands::List => cli::files::list(),
            FilesCommands::Remove { id } => cli::files::remove(id),
        },
        Commands::Tx { command } => match command {
            TxCommands::Delete { id } => cli::tx::delete(id),
            TxCommands::Memo { id, memo } => cli::tx::set_memo(id, &memo),
            TxCommands::SetCategory { id, category } => cli::tx::set_category(id, &category),
        },
        Commands::Report { command } => match command {
            ReportCommands::Heatmap { from_date, to_date } => {
                cli::report::heatmap(from_date.as_deref(), to_date.as_deref())
            }
            ReportCommands::Transactions {
                from_date,
                to_date,
                category,
            } => cli::report::transactions(
                from_date.as_deref(),
                to_date.as_deref(),
                category.as_deref(),
            ),
        },
        Commands::Export { output } => cli::export::run(output.as_deref()),
    }
}
