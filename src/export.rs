//! Writes the saved state to a JSON backup document.

use crate::model::BackupDocument;
use crate::storage::Storage;
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the saved expenses and currency from `storage` and writes them as a backup document to
/// `path`, replacing any previous export. Returns the path written.
pub async fn export_data(storage: &Storage, path: &Path) -> Result<PathBuf> {
    let expenses = storage
        .read_expenses()
        .await
        .context("Unable to read the saved expenses")?
        .unwrap_or_default();
    let selected_currency = storage
        .read_selected_currency()
        .await
        .context("Unable to read the saved currency")?;
    let document = BackupDocument::new(expenses, selected_currency);

    let json =
        serde_json::to_string_pretty(&document).context("Failed to serialize the backup")?;
    utils::write_atomic(path, json)
        .await
        .context("Unable to write the backup file")?;
    debug!(
        "Exported {} expenses to {}",
        document.expenses().len(),
        path.display()
    );
    Ok(path.to_path_buf())
}
