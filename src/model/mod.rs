//! Types that represent the core data model, such as `Expense` and `Currency`.
mod amount;
mod currency;
mod expense;
mod month;

pub use amount::{Amount, AmountError};
pub use currency::Currency;
pub use expense::{sample_expenses, Expense, NewExpense};
pub use month::{add_months, MonthPointer};
use serde::{Deserialize, Serialize};

/// The full state that is written to, and read from, a backup file.
///
/// ```json
/// {
///   "expenses": [
///     { "id": "1", "description": "Groceries", "amount": 50.0, "date": "2025-02-24", "currency": "USD" }
///   ],
///   "selectedCurrency": "USD"
/// }
/// ```
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub(crate) expenses: Vec<Expense>,
    #[serde(default)]
    pub(crate) selected_currency: Option<Currency>,
}

impl BackupDocument {
    pub fn new(expenses: Vec<Expense>, selected_currency: Option<Currency>) -> Self {
        Self {
            expenses,
            selected_currency,
        }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn selected_currency(&self) -> Option<Currency> {
        self.selected_currency
    }
}
