use crate::model::{Amount, Currency};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A single recorded spending event.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Expense {
    pub(crate) id: String,
    pub(crate) description: String,
    pub(crate) amount: Amount,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) date: NaiveDate,
    pub(crate) currency: Currency,
}

impl Expense {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: Amount,
        date: NaiveDate,
        currency: Currency,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            date,
            currency,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }
}

/// Dates are written as `YYYY-MM-DD`. Full timestamps such as `2025-02-24T10:15:00.000Z` are
/// accepted on read and truncated to their date.
fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).map_err(serde::de::Error::custom)
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("'{s}' is not a valid date, expected YYYY-MM-DD"))
}

/// What the user has typed into the new-expense form so far.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct NewExpense {
    pub description: String,
    pub amount: String,
}

impl NewExpense {
    pub fn new(description: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.amount.is_empty()
    }
}

/// Sample expenses shown on first launch, when nothing has been saved yet.
pub fn sample_expenses() -> Vec<Expense> {
    [
        ("1", "Groceries", 5000, (2025, 2, 24)),
        ("2", "Gas", 3000, (2025, 2, 23)),
        ("3", "Movie tickets", 2500, (2025, 2, 22)),
        ("4", "Dinner", 4000, (2025, 1, 15)),
        ("5", "Books", 3500, (2025, 3, 5)),
    ]
    .into_iter()
    .filter_map(|(id, description, cents, (y, m, d))| {
        let date = NaiveDate::from_ymd_opt(y, m, d)?;
        Some(Expense::new(
            id,
            description,
            Amount::new(rust_decimal::Decimal::new(cents, 2)),
            date,
            Currency::Usd,
        ))
    })
    .collect()
}
