use crate::commands::{load_store, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories, an initial `config.json` file and the
/// database, then seeds the database with sample expenses.
///
/// # Arguments
/// - `expenses_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/expenses`
///
/// # Errors
/// - Returns an error if any file operations fail or the directory was already initialized.
pub async fn init(expenses_home: &Path) -> Result<Out<()>> {
    let config = Config::create(expenses_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    let store = load_store(&config).await;
    Ok(format!(
        "Successfully created the expenses directory at '{}' with {}",
        config.root().display(),
        plural(store.expenses().len(), "sample expense", "sample expenses")
    )
    .into())
}
