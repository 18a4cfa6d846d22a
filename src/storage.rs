//! The persistence adapter.
//!
//! `Storage` is the only thing that reads or writes the two persisted keys. Its public methods
//! never fail: a failed write is logged and reported as `false`, and a failed read is logged and
//! returns the default. The `read_*`/`write_*` variants propagate errors for callers, like import,
//! that must report them.

use crate::model::{Currency, Expense};
use crate::Result;
use anyhow::Context;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// The key that holds the JSON array of expenses.
pub const EXPENSES_KEY: &str = "expenses";

/// The key that holds the selected currency code.
pub const SELECTED_CURRENCY_KEY: &str = "selected_currency";

/// A string-keyed, string-valued store. Every operation may fail.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `keys`. Keys that do not exist are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<()>;

    /// Writes every entry or, on failure, none of them.
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;
}

/// A `KeyValueStore` that lives only in memory.
///
/// Note: this is compiled even in the "production" version of this app so that the store can be
/// used without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut data = self.data.lock().await;
        for key in keys {
            data.remove(*key);
        }
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut data = self.data.lock().await;
        for (key, value) in entries {
            data.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Typed access to the persisted expense list and currency selection.
#[derive(Clone)]
pub struct Storage {
    kv: Arc<dyn KeyValueStore>,
}

impl Debug for Storage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// A `Storage` backed by a fresh `MemoryStore`.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persists `expenses`. Returns `false`, after logging, if the write failed.
    pub async fn save_expenses(&self, expenses: &[Expense]) -> bool {
        match self.write_expenses(expenses).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error saving expenses: {e:#}");
                false
            }
        }
    }

    /// Returns the persisted expenses, or an empty list if there are none or they can't be read.
    pub async fn get_expenses(&self) -> Vec<Expense> {
        match self.read_expenses().await {
            Ok(expenses) => expenses.unwrap_or_default(),
            Err(e) => {
                error!("Error getting expenses: {e:#}");
                Vec::new()
            }
        }
    }

    /// Persists the selected currency code. Returns `false`, after logging, if the write failed.
    pub async fn save_selected_currency(&self, currency: Currency) -> bool {
        match self.write_selected_currency(currency).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error saving currency: {e:#}");
                false
            }
        }
    }

    /// Returns the persisted currency, or `USD` if there is none or it can't be read.
    pub async fn get_selected_currency(&self) -> Currency {
        match self.read_selected_currency().await {
            Ok(currency) => currency.unwrap_or_default(),
            Err(e) => {
                error!("Error getting currency: {e:#}");
                Currency::default()
            }
        }
    }

    /// Removes both persisted keys. Returns `false`, after logging, if that failed.
    pub async fn clear_all_data(&self) -> bool {
        match self.kv.remove(&[EXPENSES_KEY, SELECTED_CURRENCY_KEY]).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error clearing data: {e:#}");
                false
            }
        }
    }

    /// Reads the persisted expenses. `None` means nothing has been saved yet.
    pub(crate) async fn read_expenses(&self) -> Result<Option<Vec<Expense>>> {
        let Some(json) = self.read_raw_expenses().await? else {
            return Ok(None);
        };
        let expenses = serde_json::from_str(&json).context("The saved expenses are corrupt")?;
        Ok(Some(expenses))
    }

    /// The persisted expenses as stored, whether or not they parse.
    pub(crate) async fn read_raw_expenses(&self) -> Result<Option<String>> {
        self.kv.get(EXPENSES_KEY).await
    }

    pub(crate) async fn write_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let json = serde_json::to_string(expenses).context("Unable to serialize expenses")?;
        self.kv.set(EXPENSES_KEY, &json).await?;
        debug!("Saved {} expenses", expenses.len());
        Ok(())
    }

    /// Reads the persisted currency. An unknown code is logged and treated as absent.
    pub(crate) async fn read_selected_currency(&self) -> Result<Option<Currency>> {
        let Some(code) = self.kv.get(SELECTED_CURRENCY_KEY).await? else {
            return Ok(None);
        };
        let currency = Currency::from_code(&code);
        if currency.is_none() {
            warn!("Ignoring unknown saved currency '{code}'");
        }
        Ok(currency)
    }

    pub(crate) async fn write_selected_currency(&self, currency: Currency) -> Result<()> {
        self.kv
            .set(SELECTED_CURRENCY_KEY, currency.code())
            .await
    }

    /// Writes `expenses` and, if given, `currency` together. Either both are saved or neither is.
    pub(crate) async fn write_state(
        &self,
        expenses: &[Expense],
        currency: Option<Currency>,
    ) -> Result<()> {
        let json = serde_json::to_string(expenses).context("Unable to serialize expenses")?;
        let mut entries = vec![(EXPENSES_KEY, json.as_str())];
        if let Some(currency) = currency {
            entries.push((SELECTED_CURRENCY_KEY, currency.code()));
        }
        self.kv.set_many(&entries).await?;
        debug!("Saved {} expenses", expenses.len());
        Ok(())
    }
}
