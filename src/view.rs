//! Pure functions that derive what is shown from the list of expenses. Nothing here is cached;
//! callers recompute whenever the list, month or currency changes.

use crate::model::{Amount, Currency, Expense, MonthPointer};

/// The expenses whose date falls in `month`.
pub fn expenses_for_month(expenses: &[Expense], month: MonthPointer) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|e| month.contains(e.date()))
        .cloned()
        .collect()
}

/// The expenses recorded in `currency`.
pub fn expenses_for_currency(expenses: &[Expense], currency: Currency) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|e| e.currency() == currency)
        .cloned()
        .collect()
}

/// The exact sum of the amounts in `expenses`.
pub fn total(expenses: &[Expense]) -> Amount {
    expenses.iter().map(Expense::amount).sum()
}

/// Totals for each month of `year` in `currency`; index 0 is January.
pub fn monthly_totals(expenses: &[Expense], year: i32, currency: Currency) -> [Amount; 12] {
    let mut totals = [Amount::ZERO; 12];
    for e in expenses_for_currency(expenses, currency) {
        let month = MonthPointer::of(e.date());
        if month.year() == year {
            let ix = month.month() as usize - 1;
            totals[ix] = totals[ix] + e.amount();
        }
    }
    totals
}

/// The expenses ordered by date, most recent first. Expenses on the same day keep their order.
pub fn newest_first(expenses: &[Expense]) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    sorted
}
