//! Add and remove command handlers.

use crate::args::{AddArgs, RemoveArgs};
use crate::commands::{load_store, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Expense;
use crate::{Config, Result};
use anyhow::anyhow;
use chrono::Local;

/// Records a new expense. The date defaults to today and the currency to the selected one.
///
/// # Errors
/// - The description is blank or the amount is not a non-negative number.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Expense>> {
    let mut store = load_store(&config).await;
    let date = args.date().unwrap_or_else(|| Local::now().date_naive());
    let currency = args.currency().unwrap_or(store.current_currency());

    let added = store
        .add_expense(args.description(), args.amount(), date, currency)
        .await
        .cloned()
        .ok_or_else(|| {
            anyhow!(
                "An expense needs a description and an amount that is zero or more, got '{}' and \
                '{}'",
                args.description(),
                args.amount()
            )
        })
        .pub_result(ErrorType::Request)?;

    let message = format!(
        "Added {} {} on {} with id {}",
        added.description(),
        added.amount().display_with(added.currency()),
        added.date(),
        added.id()
    );
    Ok(Out::new(message, added))
}

/// Removes the expense with the given id. An id that does not exist is reported but is not an
/// error.
pub async fn remove(config: Config, args: RemoveArgs) -> Result<Out<bool>> {
    let mut store = load_store(&config).await;
    let removed = store.remove_expense(args.id()).await;
    let message = if removed {
        format!("Removed expense {}", args.id())
    } else {
        format!("There is no expense with id {}", args.id())
    };
    Ok(Out::new(message, removed))
}
