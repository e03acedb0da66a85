use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::{Category, CategoryGuess};
use crate::store;

/// Edit distance at or under which two category names are treated as probable
/// typos of each other.
pub const MAX_CATEGORY_DISTANCE: usize = 3;

/// Keyword fallbacks for memos with no learned rule on file. First substring
/// hit wins. These carry no category id; the caller resolves (or creates) the
/// category by name.
const KEYWORD_CATEGORIES: &[(&str, &str)] = &[
    ("amzn mktp", "amazon"),
    ("amazon", "amazon"),
    ("target", "target"),
    ("wholefds", "groceries"),
    ("whole foods", "groceries"),
    ("trader joe", "groceries"),
    ("starbucks", "coffee"),
    ("dunkin", "coffee"),
    ("netflix", "streaming"),
    ("spotify", "streaming"),
    ("uber", "rideshare"),
    ("lyft", "rideshare"),
    ("exxon", "gas"),
    ("sunoco", "gas"),
];

fn non_memo_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\s:]").expect("static regex"))
}

/// Normalize a raw memo into the join key used for all category matching:
/// punctuation to spaces, whitespace runs collapsed, lowercased.
pub fn clean_string(memo: &str) -> String {
    let stripped = non_memo_chars().replace_all(memo, " ");
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row formulation; `diag` carries the previous row's j-1 cell.
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = if ca == cb { diag } else { diag + 1 };
            diag = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }
    row[b.len()]
}

/// How the user is asked when the resolution core needs input. The console
/// implementation lives in the CLI; tests supply canned answers.
pub trait CategoryPrompt {
    /// Ask for a category name for a memo with nothing on file. `known_names`
    /// is the sorted list of existing categories.
    fn ask_category(&mut self, known_names: &[String]) -> Result<String>;

    /// Confirm reusing an existing near-duplicate category name.
    fn confirm_similar(&mut self, suggestion: &str) -> Result<bool>;
}

/// Resolves categories for cleaned memos using, in order: the learned rule
/// table, the keyword fallbacks, and finally the prompt. Owns in-memory
/// caches of both the rule table and the category list, refreshed explicitly
/// after every write.
pub struct Categorizer<'a> {
    conn: &'a Connection,
    memo_map: Option<HashMap<String, CategoryGuess>>,
    categories: Option<Vec<Category>>,
}

impl<'a> Categorizer<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            memo_map: None,
            categories: None,
        }
    }

    fn refresh_memo_map(&mut self) -> Result<()> {
        let map = store::get_memo_category_map(self.conn)?
            .into_iter()
            .collect::<HashMap<_, _>>();
        self.memo_map = Some(map);
        Ok(())
    }

    fn refresh_categories(&mut self) -> Result<()> {
        self.categories = Some(store::list_categories(self.conn)?);
        Ok(())
    }

    fn memo_map(&mut self) -> Result<&HashMap<String, CategoryGuess>> {
        if self.memo_map.is_none() {
            self.refresh_memo_map()?;
        }
        Ok(self.memo_map.get_or_insert_with(HashMap::new))
    }

    fn categories(&mut self) -> Result<&[Category]> {
        if self.categories.is_none() {
            self.refresh_categories()?;
        }
        Ok(self.categories.get_or_insert_with(Vec::new))
    }

    /// Best guess for a cleaned memo: learned exact rule first, then the
    /// keyword table (id-less), then nothing.
    pub fn guess_best_category(&mut self, cleaned_memo: &str) -> Result<Option<CategoryGuess>> {
        if let Some(found) = self.memo_map()?.get(cleaned_memo) {
            return Ok(Some(found.clone()));
        }

        for (keyword, category_name) in KEYWORD_CATEGORIES {
            if cleaned_memo.contains(keyword) {
                return Ok(Some(CategoryGuess {
                    category_id: None,
                    category_name: (*category_name).to_string(),
                    rule_id: None,
                }));
            }
        }

        Ok(None)
    }

    /// Existing category whose name is within MAX_CATEGORY_DISTANCE edits of
    /// the input, if any.
    pub fn get_very_similar_category(&mut self, input_name: &str) -> Result<Option<Category>> {
        for category in self.categories()? {
            if levenshtein(&category.name, input_name) <= MAX_CATEGORY_DISTANCE {
                return Ok(Some(category.clone()));
            }
        }
        Ok(None)
    }

    /// All known category names, sorted for deterministic listing.
    pub fn get_category_names(&mut self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.categories()?.iter().map(|c| c.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    pub fn insert_category(&mut self, name: &str) -> Result<i64> {
        let id = store::create_category(self.conn, name)?;
        self.refresh_categories()?;
        Ok(id)
    }

    /// Learn a memo -> category association: persist a rule for the cleaned
    /// memo unless one is already on file, then refresh the cache.
    pub fn make_note_of_memo_and_category(
        &mut self,
        cleaned_memo: &str,
        category_id: i64,
    ) -> Result<()> {
        if self.memo_map()?.contains_key(cleaned_memo) {
            return Ok(());
        }
        store::create_match_rule(self.conn, category_id, cleaned_memo)?;
        self.refresh_memo_map()
    }

    /// Full three-tier resolution for a cleaned memo. Exact rule hits bump
    /// the rule's usage count; keyword hits resolve (or create) the named
    /// category; anything else goes to the prompt, with an edit-distance
    /// check against existing names before a new category is created.
    pub fn determine_category_id(
        &mut self,
        cleaned_memo: &str,
        prompt: &mut dyn CategoryPrompt,
    ) -> Result<i64> {
        if let Some(guess) = self.guess_best_category(cleaned_memo)? {
            if let Some(rule_id) = guess.rule_id {
                store::record_rule_hit(self.conn, rule_id)?;
            }
            if let Some(id) = guess.category_id {
                return Ok(id);
            }
            // Keyword path: no id attached. Look the category up by name,
            // creating it on first sight.
            if let Some(category) = store::get_category_by_name(self.conn, &guess.category_name)? {
                return Ok(category.id);
            }
            return self.insert_category(&guess.category_name);
        }

        let known = self.get_category_names()?;
        let typed = prompt.ask_category(&known)?.trim().to_lowercase();

        if let Some(similar) = self.get_very_similar_category(&typed)? {
            if similar.name == typed {
                return Ok(similar.id);
            }
            if prompt.confirm_similar(&similar.name)? {
                return Ok(similar.id);
            }
        }

        self.insert_category(&typed)
    }

    /// Move a rule to another category and backfill every non-deleted
    /// transaction whose cleaned memo matches the rule text. Returns the
    /// number of transactions updated.
    pub fn reassign_rule(&mut self, rule_id: i64, category_id: i64) -> Result<usize> {
        store::reassign_match_rule(self.conn, rule_id, category_id)?;
        let rule = store::get_match_rule(self.conn, rule_id)?;

        let mut updated = 0;
        for (txn_id, memo_raw) in store::transactions_for_backfill(self.conn)? {
            if clean_string(&memo_raw) == rule.match_text {
                store::set_transaction_category(self.conn, txn_id, category_id)?;
                updated += 1;
            }
        }

        self.refresh_memo_map()?;
        Ok(updated)
    }
}
