pub mod categories;
pub mod categorize;
pub mod export;
pub mod files;
pub mod ingest;
pub mod init;
pub mod report;
pub mod rules;
pub mod tx;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "moneypit",
    about = "Bank-statement ledger: ingest statement CSVs, learn categories, report spending.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up moneypit: choose a data directory and initialize the database.
    Init {
        /// Path for moneypit data (default: ~/Documents/moneypit)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Ingest one statement CSV, or every CSV in a directory.
    Ingest {
        /// Path to a statement file or a directory of them
        path: String,
    },
    /// Interactively categorize transactions with no category on file.
    Categorize,
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage learned memo-to-category rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Manage ingested statement files.
    Files {
        #[command(subcommand)]
        command: FilesCommands,
    },
    /// Edit single transactions.
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },
    /// Aggregate views over the ledger.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export the ledger as CSV.
    Export {
        /// Output path (stdout when omitted)
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List all categories.
    List,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List learned rules with usage counts.
    List,
    /// Move a rule to another category and backfill matching transactions.
    Reassign {
        /// Rule id (see `rules list`)
        rule_id: i64,
        /// Target category name
        #[arg(long)]
        category: String,
    },
}

#[derive(Subcommand)]
pub enum FilesCommands {
    /// List ingested statement files.
    List,
    /// Remove a statement file and every transaction it produced.
    Remove {
        /// File id (see `files list`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Soft-delete a transaction (kept in the database, hidden everywhere).
    Delete {
        /// Transaction id
        id: i64,
    },
    /// Override a transaction's display memo. The raw memo stays untouched.
    Memo {
        /// Transaction id
        id: i64,
        /// New display text
        memo: String,
    },
    /// Assign a category by name, creating the category if needed.
    SetCategory {
        /// Transaction id
        id: i64,
        /// Category name
        category: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Monthly spending by category over a date range.
    Heatmap {
        /// Start date: YYYY-MM-DD (default: Jan 1 of the current year)
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD (default: today)
        #[arg(long = "to")]
        to_date: Option<String>,
    },
    /// Transactions in a date range, newest first.
    Transactions {
        #[arg(long = "from")]
        from_date: Option<String>,
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },
}
