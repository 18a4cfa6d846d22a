//! List, total and summary command handlers. These only read.

use crate::args::{SummaryArgs, ViewArgs};
use crate::commands::{load_store, plural, Out};
use crate::model::{Amount, Currency, Expense, MonthPointer};
use crate::store::ExpenseStore;
use crate::{view, Config, Result};
use chrono::Datelike;
use serde::Serialize;
use std::fmt::Write;

/// The expenses of one month in one currency.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthReport {
    pub month: String,
    pub currency: Currency,
    pub expenses: Vec<Expense>,
    pub total: Amount,
}

/// The total for one month, as part of a `YearSummary`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: String,
    pub total: Amount,
}

/// Per-month totals for one year in one currency.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub currency: Currency,
    pub months: Vec<MonthTotal>,
    pub total: Amount,
}

/// Lists the expenses of a month in a currency, most recent first.
pub async fn list(config: Config, args: ViewArgs) -> Result<Out<MonthReport>> {
    let store = load_store(&config).await;
    let (month, report) = month_report(&store, &args);

    let mut message = format!("{} ({})", month.label(), report.currency);
    if report.expenses.is_empty() {
        message.push_str("\nNo expenses");
    }
    for e in &report.expenses {
        let _ = write!(
            message,
            "\n{:>14}  {}  {:>12}  {}",
            e.id(),
            e.date(),
            e.amount().display_with(e.currency()),
            e.description()
        );
    }
    let _ = write!(
        message,
        "\n{}, total {}",
        plural(report.expenses.len(), "expense", "expenses"),
        report.total.display_with(report.currency)
    );
    Ok(Out::new(message, report))
}

/// Shows the total of a month in a currency.
pub async fn total(config: Config, args: ViewArgs) -> Result<Out<MonthReport>> {
    let store = load_store(&config).await;
    let (month, report) = month_report(&store, &args);
    let message = format!(
        "Total for {}: {}",
        month.label(),
        report.total.display_with(report.currency)
    );
    Ok(Out::new(message, report))
}

/// Shows the total of each month of a year in a currency.
pub async fn summary(config: Config, args: SummaryArgs) -> Result<Out<YearSummary>> {
    let store = load_store(&config).await;
    let year = args.year().unwrap_or(store.current_date().year());
    let currency = args.currency().unwrap_or(store.current_currency());

    let totals = view::monthly_totals(store.expenses(), year, currency);
    let mut months = Vec::with_capacity(totals.len());
    let mut message = format!("{year} ({currency})");
    for (ix, month_total) in totals.iter().enumerate() {
        let label = MonthPointer::new(year, ix as u32 + 1)
            .map(|m| m.to_string())
            .unwrap_or_default();
        let _ = write!(
            message,
            "\n{label}  {:>12}",
            month_total.display_with(currency)
        );
        months.push(MonthTotal {
            month: label,
            total: *month_total,
        });
    }
    let total: Amount = totals.iter().sum();
    let _ = write!(message, "\nTotal    {:>12}", total.display_with(currency));

    Ok(Out::new(
        message,
        YearSummary {
            year,
            currency,
            months,
            total,
        },
    ))
}

fn month_report(store: &ExpenseStore, args: &ViewArgs) -> (MonthPointer, MonthReport) {
    let month = args.month().unwrap_or(store.current_month());
    let currency = args.currency().unwrap_or(store.current_currency());
    let expenses = view::newest_first(&view::expenses_for_currency(
        &view::expenses_for_month(store.expenses(), month),
        currency,
    ));
    let total = view::total(&expenses);
    (
        month,
        MonthReport {
            month: month.to_string(),
            currency,
            expenses,
            total,
        },
    )
}
