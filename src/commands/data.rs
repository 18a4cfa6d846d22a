//! Export, import and clear command handlers.

use crate::args::ImportArgs;
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::export::export_data;
use crate::import::{import_data, ImportSummary, PathPicker};
use crate::store::ExpenseStore;
use crate::{Config, Result};
use anyhow::anyhow;
use std::path::PathBuf;

/// Writes the saved data to the export file in the expenses home directory.
pub async fn export(config: Config) -> Result<Out<PathBuf>> {
    let path = export_data(&config.storage(), &config.export_path())
        .await
        .pub_result(ErrorType::Export)?;
    Ok(Out::new(format!("Exported to '{}'", path.display()), path))
}

/// Replaces the saved data with the contents of a backup file. Nothing is changed if the file is
/// not a valid backup.
pub async fn import(config: Config, args: ImportArgs) -> Result<Out<ImportSummary>> {
    let backup = config.backup();
    let summary = import_data(
        &config.storage(),
        &PathPicker::new(args.file()),
        Some(&backup),
    )
    .await
    .pub_result(ErrorType::Import)?;

    let mut message = format!(
        "Imported {} from '{}'",
        plural(summary.expense_count, "expense", "expenses"),
        summary.source
    );
    if let Some(currency) = summary.selected_currency {
        message.push_str(&format!(", selected currency is {currency}"));
    }
    if let Some(snapshot) = &summary.snapshot {
        message.push_str(&format!(
            ". The previous data was saved to '{}'",
            snapshot.display()
        ));
    }
    Ok(Out::new(message, summary))
}

/// Deletes all saved expenses and the selected currency.
pub async fn clear(config: Config) -> Result<Out<()>> {
    let mut store = ExpenseStore::new(config.storage());
    if !store.clear_all_data().await {
        return Err(anyhow!("Unable to clear the saved data")).pub_result(ErrorType::Storage);
    }
    Ok("Cleared all saved expenses and the selected currency".into())
}
