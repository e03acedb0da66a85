#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct MatchRule {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub match_text: String,
    pub hit_count: i64,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct InputFileRecord {
    pub id: i64,
    pub bank_name: String,
    pub filename: String,
    pub created_at_human: String,
    pub processed_success_at: Option<i64>,
    pub checksum: Option<String>,
    pub transaction_count: i64,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct UncategorizedTxn {
    pub id: i64,
    pub amount: f64,
    pub date_human: String,
    pub memo_raw: String,
    pub bank_name: String,
}

/// A ledger row as shown in listings and exports. `memo` is the custom memo
/// when one is set, otherwise the raw statement text.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub id: i64,
    pub date_human: String,
    pub amount: f64,
    pub memo: String,
    pub category: Option<String>,
    pub bank_name: String,
}

/// Intermediate representation from a statement parser before DB insert.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub date: String,
    pub memo: String,
    pub amount: f64,
}

/// One memo -> category association held in the Categorizer cache. Keyword
/// guesses carry no ids; the caller resolves the category by name.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGuess {
    pub category_id: Option<i64>,
    pub category_name: String,
    pub rule_id: Option<i64>,
}
