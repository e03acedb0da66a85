use chrono::NaiveDate;

use crate::error::{MoneypitError, Result};
use crate::models::ParsedLine;

// ---------------------------------------------------------------------------
// Field splitting
// ---------------------------------------------------------------------------

/// Split one statement line on commas, protecting commas inside quoted
/// fields. The in-quotes flag toggles on every `"` seen, so a line with an
/// odd quote count still splits without panicking. Quote characters are
/// stripped from the output fields.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields.iter().map(|f| f.trim().to_string()).collect()
}

fn parse_date(raw: &str, format: &str) -> Result<String> {
    NaiveDate::parse_from_str(raw.trim(), format)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|e| MoneypitError::BadDate(raw.to_string(), e.to_string()))
}

fn parse_amount(raw: &str) -> Result<f64> {
    let s = raw.trim().replace('$', "");
    s.parse()
        .map_err(|_| MoneypitError::MalformedLine(format!("non-numeric amount '{raw}'")))
}

// ---------------------------------------------------------------------------
// Source banks — enum dispatch, one variant per statement format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBank {
    Chase,
    CapitalOne,
    Barclays,
    AmericanExpress,
}

impl SourceBank {
    pub const ALL: &'static [SourceBank] = &[
        SourceBank::Chase,
        SourceBank::CapitalOne,
        SourceBank::Barclays,
        SourceBank::AmericanExpress,
    ];

    /// Seeded database id. Stable across runs.
    pub fn id(&self) -> i64 {
        match self {
            Self::Chase => 1,
            Self::CapitalOne => 2,
            Self::Barclays => 3,
            Self::AmericanExpress => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Chase => "Chase",
            Self::CapitalOne => "CapitalOne",
            Self::Barclays => "Barclays",
            Self::AmericanExpress => "AmericanExpress",
        }
    }

    /// Pick the parser for a statement by case-insensitive filename
    /// substring. The slug lists cover the issuers' historical export names.
    pub fn from_filename(filename: &str) -> Option<SourceBank> {
        let name = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename)
            .to_lowercase();

        const CAPITAL_ONE_SLUGS: &[&str] = &[
            "capital_one",
            "capitalone",
            "capital-one",
            "360performancesavings",
            "360checking",
            "l-tsharedchecking",
        ];
        const BARCLAYS_SLUGS: &[&str] = &["barclays", "creditcard"];
        const AMEX_SLUGS: &[&str] = &[
            "american_express",
            "americanexpress",
            "american-express",
            "amex",
        ];

        if CAPITAL_ONE_SLUGS.iter().any(|s| name.contains(s)) {
            Some(Self::CapitalOne)
        } else if BARCLAYS_SLUGS.iter().any(|s| name.contains(s)) {
            Some(Self::Barclays)
        } else if AMEX_SLUGS.iter().any(|s| name.contains(s)) {
            Some(Self::AmericanExpress)
        } else if name.contains("chase") {
            Some(Self::Chase)
        } else {
            None
        }
    }

    fn ignored_slugs(&self) -> &'static [&'static str] {
        match self {
            Self::Chase => &["transaction date,post date,description,category,type,amount,memo"],
            Self::CapitalOne => &["account number,transaction date,transaction amount"],
            Self::Barclays => &[
                "barclays bank delaware",
                "account number:",
                "account balance as of",
                "transaction date,description,category,amount",
            ],
            Self::AmericanExpress => &[
                "date,description,card member,account #,amount",
                "date,description,amount",
            ],
        }
    }

    /// True for blank lines and known header/boilerplate rows.
    pub fn is_ignored_line(&self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }
        let line = line.to_lowercase();
        self.ignored_slugs().iter().any(|slug| line.contains(slug))
    }

    /// Normalize one raw statement line into `(date, memo, signed amount)`.
    /// Ledger convention: negative = money out.
    pub fn parse_line(&self, line: &str) -> Result<ParsedLine> {
        match self {
            Self::Chase => parse_chase(line),
            Self::CapitalOne => parse_capital_one(line),
            Self::Barclays => parse_barclays(line),
            Self::AmericanExpress => parse_american_express(line),
        }
    }
}

// 5279,12/31/22,360.47,Credit,Monthly Interest Paid,136065.38
fn parse_capital_one(line: &str) -> Result<ParsedLine> {
    let fields = split_fields(line);
    if fields.len() != 6 {
        return Err(MoneypitError::MalformedLine(format!(
            "expected 6 fields, got {}: '{line}'",
            fields.len()
        )));
    }
    let date = parse_date(&fields[1], "%m/%d/%y")?;
    let mut amount = parse_amount(&fields[2])?;
    // CapitalOne reports debits as positive magnitudes.
    if fields[3].eq_ignore_ascii_case("debit") {
        amount = -amount;
    }
    Ok(ParsedLine {
        date,
        memo: fields[4].clone(),
        amount,
    })
}

// 01/02/2023,"Store, Inc",Groceries,-12.34
fn parse_barclays(line: &str) -> Result<ParsedLine> {
    let fields = split_fields(line);
    if fields.len() != 4 {
        return Err(MoneypitError::MalformedLine(format!(
            "expected 4 fields, got {}: '{line}'",
            fields.len()
        )));
    }
    let date = parse_date(&fields[0], "%m/%d/%Y")?;
    let amount = parse_amount(&fields[3])?;
    Ok(ParsedLine {
        date,
        memo: fields[1].clone(),
        amount,
    })
}

// 12/29/2022,12/30/2022,WHOLEFDS AVR 10371,Groceries,Sale,-99.28,
// The trailing memo column is unused and usually empty; exports without the
// trailing comma produce 6 fields instead of 7.
fn parse_chase(line: &str) -> Result<ParsedLine> {
    let fields = split_fields(line);
    if !(6..=7).contains(&fields.len()) {
        return Err(MoneypitError::MalformedLine(format!(
            "expected 6-7 fields, got {}: '{line}'",
            fields.len()
        )));
    }
    let date = parse_date(&fields[0], "%m/%d/%Y")?;
    let amount = parse_amount(&fields[5])?;
    Ok(ParsedLine {
        date,
        memo: fields[2].clone(),
        amount,
    })
}

// Two layouts: date,description,amount
//          or: date,description,card_member,account_id,amount
fn parse_american_express(line: &str) -> Result<ParsedLine> {
    let fields = split_fields(line);
    let (memo, raw_amount) = match fields.len() {
        3 => (&fields[1], &fields[2]),
        5 => (&fields[1], &fields[4]),
        n => {
            return Err(MoneypitError::MalformedLine(format!(
                "expected 3 or 5 fields, got {n}: '{line}'"
            )))
        }
    };
    let date = parse_date(&fields[0], "%m/%d/%Y")?;
    // Amex reports charges as positive; the ledger wants them negative.
    let amount = -parse_amount(raw_amount)?;
    Ok(ParsedLine {
        date,
        memo: memo.clone(),
        amount,
    })
}
