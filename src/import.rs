//! Restores the saved state from a JSON backup document chosen by the user.
//!
//! Import is all-or-nothing: the whole document is parsed and checked before anything is written,
//! so a document with a bad currency or a single bad expense changes nothing.

use crate::backup::{Backup, PRE_IMPORT};
use crate::model::{BackupDocument, Currency};
use crate::storage::Storage;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A file chosen by the user.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PickedFile {
    pub name: String,
    pub contents: String,
}

/// Lets the user choose the file to import. `Ok(None)` means the user cancelled.
#[async_trait::async_trait]
pub trait FilePicker: Send + Sync {
    async fn pick(&self) -> Result<Option<PickedFile>>;
}

/// A `FilePicker` that has already been told which file to use, e.g. from a command line argument.
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: PathBuf,
}

impl PathPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl FilePicker for PathPicker {
    async fn pick(&self) -> Result<Option<PickedFile>> {
        let contents = utils::read(&self.path).await?;
        Ok(Some(PickedFile {
            name: self.path.display().to_string(),
            contents,
        }))
    }
}

/// What an import changed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ImportSummary {
    pub source: String,
    pub expense_count: usize,
    pub selected_currency: Option<Currency>,
    /// Where the data that was replaced was saved, if a snapshot was taken.
    pub snapshot: Option<PathBuf>,
}

/// Asks `picker` for a file, validates it as a backup document and, only if it is valid, replaces
/// the saved expenses and, when the document has one, the saved currency.
///
/// When `backup` is given, the data about to be replaced is saved there first.
///
/// # Errors
/// - The user cancelled, or the file can't be read.
/// - The file is not JSON, has no `expenses` list, or contains an invalid expense or currency.
/// - Saving the snapshot or the imported data failed.
pub async fn import_data(
    storage: &Storage,
    picker: &dyn FilePicker,
    backup: Option<&Backup>,
) -> Result<ImportSummary> {
    let Some(file) = picker.pick().await.context("Unable to read the chosen file")? else {
        bail!("No file was selected");
    };
    debug!("Importing {}", file.name);

    let document = parse_document(&file.contents)
        .with_context(|| format!("'{}' is not a valid backup", file.name))?;

    let snapshot = match backup {
        Some(backup) => Some(snapshot_saved_state(storage, backup).await?),
        None => None,
    };

    storage
        .write_state(document.expenses(), document.selected_currency())
        .await
        .context("Unable to save the imported data")?;

    info!(
        "Imported {} expenses from {}",
        document.expenses().len(),
        file.name
    );
    Ok(ImportSummary {
        source: file.name,
        expense_count: document.expenses().len(),
        selected_currency: document.selected_currency(),
        snapshot,
    })
}

/// Saves the state an import is about to replace. Expenses that can't be parsed are saved as they
/// are stored, so that a corrupt list never blocks an import.
async fn snapshot_saved_state(storage: &Storage, backup: &Backup) -> Result<PathBuf> {
    match storage.read_expenses().await {
        Ok(expenses) => {
            let current = BackupDocument::new(
                expenses.unwrap_or_default(),
                storage.read_selected_currency().await?,
            );
            backup.save_json(PRE_IMPORT, &current).await
        }
        Err(e) => {
            warn!("Saving the current expenses unparsed: {e:#}");
            let raw = storage.read_raw_expenses().await?.unwrap_or_default();
            backup.save_raw(PRE_IMPORT, &raw).await
        }
    }
}

/// Parses and checks a backup document without touching any saved state.
pub fn parse_document(contents: &str) -> Result<BackupDocument> {
    let document: BackupDocument =
        serde_json::from_str(contents).context("The file could not be parsed")?;

    let mut ids = HashSet::new();
    for (ix, expense) in document.expenses().iter().enumerate() {
        if expense.id().is_empty() {
            bail!("Expense {} has an empty id", ix + 1);
        }
        if !ids.insert(expense.id()) {
            bail!("Expense id '{}' appears more than once", expense.id());
        }
        if expense.description().trim().is_empty() {
            bail!("Expense '{}' has an empty description", expense.id());
        }
        if expense.amount().is_negative() {
            bail!("Expense '{}' has a negative amount", expense.id());
        }
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export_data;
    use crate::model::sample_expenses;
    use crate::storage::{KeyValueStore, MemoryStore, EXPENSES_KEY, SELECTED_CURRENCY_KEY};
    use crate::test::{FailingStore, TestEnv};
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};

    /// A `FilePicker` that hands back fixed contents, or nothing.
    struct StaticPicker(Option<&'static str>);

    #[async_trait::async_trait]
    impl FilePicker for StaticPicker {
        async fn pick(&self) -> Result<Option<PickedFile>> {
            Ok(self.0.map(|contents| PickedFile {
                name: "picked.json".to_string(),
                contents: contents.to_string(),
            }))
        }
    }

    /// A `MemoryStore` that fails once it has accepted `writes_left` key writes, e.g. a disk that
    /// fills up partway through.
    struct LimitedStore {
        inner: MemoryStore,
        writes_left: Mutex<usize>,
    }

    impl LimitedStore {
        fn new(inner: MemoryStore, writes_left: usize) -> Self {
            Self {
                inner,
                writes_left: Mutex::new(writes_left),
            }
        }

        fn take_writes(&self, count: usize) -> Result<()> {
            let mut left = self.writes_left.lock().unwrap();
            if *left < count {
                return Err(anyhow!("disk full"));
            }
            *left -= count;
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl KeyValueStore for LimitedStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.take_writes(1)?;
            self.inner.set(key, value).await
        }

        async fn remove(&self, keys: &[&str]) -> Result<()> {
            self.inner.remove(keys).await
        }

        async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
            self.take_writes(entries.len())?;
            self.inner.set_many(entries).await
        }
    }

    async fn saved_state(storage: &Storage) -> BackupDocument {
        BackupDocument::new(
            storage.read_expenses().await.unwrap().unwrap_or_default(),
            storage.read_selected_currency().await.unwrap(),
        )
    }

    #[tokio::test]
    async fn test_import_export_round_trip() {
        let env = TestEnv::new().await;
        let config = env.config();
        let storage = config.storage();
        storage.save_expenses(&sample_expenses()).await;
        storage.save_selected_currency(Currency::Gbp).await;
        let exported = saved_state(&storage).await;

        let path = export_data(&storage, &config.export_path()).await.unwrap();
        assert!(storage.clear_all_data().await);

        let summary = import_data(&storage, &PathPicker::new(&path), None)
            .await
            .unwrap();
        assert_eq!(summary.expense_count, 5);
        assert_eq!(summary.selected_currency, Some(Currency::Gbp));
        assert_eq!(saved_state(&storage).await, exported);
    }

    #[tokio::test]
    async fn test_import_snapshots_replaced_data() {
        let env = TestEnv::new().await;
        let config = env.config();
        let storage = config.storage();
        storage.save_expenses(&sample_expenses()).await;
        let before = saved_state(&storage).await;

        let picker = StaticPicker(Some(r#"{"expenses": [], "selectedCurrency": "SEK"}"#));
        let backup = config.backup();
        let summary = import_data(&storage, &picker, Some(&backup)).await.unwrap();

        let snapshot = summary.snapshot.unwrap();
        let saved: BackupDocument = utils::deserialize(&snapshot).await.unwrap();
        assert_eq!(saved, before);
        assert!(storage.get_expenses().await.is_empty());
        assert_eq!(storage.get_selected_currency().await, Currency::Sek);
    }

    #[tokio::test]
    async fn test_import_replaces_corrupt_saved_expenses() {
        let env = TestEnv::new().await;
        let kv = Arc::new(MemoryStore::new());
        kv.set(EXPENSES_KEY, "[{broken").await.unwrap();
        let storage = Storage::new(kv);

        let picker = StaticPicker(Some(
            r#"{"expenses": [{"id": "9", "description": "Tea", "amount": 2,
                "date": "2025-01-02", "currency": "GBP"}], "selectedCurrency": "GBP"}"#,
        ));
        let backup = env.config().backup();
        let summary = import_data(&storage, &picker, Some(&backup)).await.unwrap();

        let snapshot = summary.snapshot.unwrap();
        assert_eq!(utils::read(&snapshot).await.unwrap(), "[{broken");
        assert_eq!(storage.get_expenses().await.len(), 1);
        assert_eq!(storage.get_selected_currency().await, Currency::Gbp);
    }

    #[tokio::test]
    async fn test_import_failed_write_changes_nothing() {
        let inner = MemoryStore::new();
        inner.set(EXPENSES_KEY, "[]").await.unwrap();
        inner.set(SELECTED_CURRENCY_KEY, "USD").await.unwrap();
        // Room for the expenses but not the currency as well
        let storage = Storage::new(Arc::new(LimitedStore::new(inner, 1)));
        let before = saved_state(&storage).await;

        let picker = StaticPicker(Some(
            r#"{"expenses": [{"id": "9", "description": "Tea", "amount": 2,
                "date": "2025-01-02", "currency": "SEK"}], "selectedCurrency": "SEK"}"#,
        ));
        let err = import_data(&storage, &picker, None).await.unwrap_err();
        assert!(format!("{err:#}").contains("disk full"), "{err:#}");
        assert_eq!(saved_state(&storage).await, before);
    }

    #[tokio::test]
    async fn test_import_without_currency_keeps_saved_currency() {
        let storage = Storage::in_memory();
        storage.save_selected_currency(Currency::Jpy).await;
        let picker = StaticPicker(Some(
            r#"{"expenses": [{"id": "9", "description": "Tea", "amount": 2,
                "date": "2025-01-02", "currency": "JPY"}]}"#,
        ));
        let summary = import_data(&storage, &picker, None).await.unwrap();
        assert_eq!(summary.selected_currency, None);
        assert_eq!(storage.get_selected_currency().await, Currency::Jpy);
        assert_eq!(storage.get_expenses().await.len(), 1);
    }

    #[tokio::test]
    async fn test_import_rejects_bad_documents_without_changes() {
        let bad: &[&'static str] = &[
            "not json at all",
            r#"{"selectedCurrency": "USD"}"#,
            r#"{"expenses": {}}"#,
            r#"{"expenses": [], "selectedCurrency": "CAD"}"#,
            r#"{"expenses": [{"id": "1", "description": "x", "amount": "abc",
                "date": "2025-01-02", "currency": "USD"}], "selectedCurrency": "EUR"}"#,
            r#"{"expenses": [{"id": "1", "description": "x", "amount": 1,
                "date": "2025-01-02", "currency": "USD"},
                {"id": "1", "description": "y", "amount": 2,
                "date": "2025-01-03", "currency": "USD"}]}"#,
            r#"{"expenses": [{"id": "1", "description": "", "amount": 1,
                "date": "2025-01-02", "currency": "USD"}]}"#,
            r#"{"expenses": [{"id": "1", "description": "x", "amount": -1,
                "date": "2025-01-02", "currency": "USD"}]}"#,
            r#"{"expenses": [{"id": "1", "description": "x",
                "amount": 79228162514264337593543950335,
                "date": "2025-01-02", "currency": "USD"}]}"#,
        ];

        let storage = Storage::in_memory();
        storage.save_expenses(&sample_expenses()).await;
        storage.save_selected_currency(Currency::Usd).await;
        let before = saved_state(&storage).await;

        for &contents in bad {
            let err = import_data(&storage, &StaticPicker(Some(contents)), None)
                .await
                .unwrap_err();
            assert!(
                format!("{err:#}").contains("is not a valid backup"),
                "{contents}: {err:#}"
            );
            assert_eq!(saved_state(&storage).await, before);
        }
    }

    #[tokio::test]
    async fn test_import_cancelled() {
        let storage = Storage::in_memory();
        let err = import_data(&storage, &StaticPicker(None), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No file was selected");
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let picker = PathPicker::new(dir.path().join("nope.json"));
        let err = import_data(&Storage::in_memory(), &picker, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unable to read the chosen file"));
    }

    #[tokio::test]
    async fn test_import_reports_storage_failure() {
        let storage = Storage::new(Arc::new(FailingStore));
        let picker = StaticPicker(Some(r#"{"expenses": []}"#));
        assert!(import_data(&storage, &picker, None).await.is_err());
    }

    #[test]
    fn test_parse_document_accepts_timestamps() {
        let doc = parse_document(
            r#"{"expenses": [{"id": "1", "description": "Groceries", "amount": 85.75,
                "date": "2025-02-24T09:00:00.000Z", "currency": "USD"}],
                "selectedCurrency": null}"#,
        )
        .unwrap();
        assert_eq!(doc.expenses()[0].date().to_string(), "2025-02-24");
        assert_eq!(doc.selected_currency(), None);
    }
}
