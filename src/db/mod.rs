//! This module is responsible for reading, writing and managing the SQLite database. The database
//! holds a single `kv` table of string keys and string values.

pub(crate) mod migrations;

use crate::storage::KeyValueStore;
use crate::Result;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Opens a connection pool
    /// - Updates the schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        Self::open(path, false).await
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        Self::open(path, true).await
    }

    async fn open(path: &Path, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open SQLite database at {}", path.display()))?;

        let version = migrations::current_version(&pool).await?;
        migrations::run(&pool, version, migrations::CURRENT_VERSION)
            .await
            .context("Unable to migrate the database schema")?;
        debug!("Opened database {}", path.display());
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for Db {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        trace!("get {key}");
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to read key '{key}'"))?;
        Ok(row.map(|r| r.0))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        trace!("set {key}");
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
            ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to write key '{key}'"))?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        for key in keys {
            trace!("remove {key}");
            sqlx::query("DELETE FROM kv WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Unable to remove key '{key}'"))?;
        }
        tx.commit().await.context("Failed to commit transaction")
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        for (key, value) in entries {
            trace!("set {key}");
            sqlx::query(
                "INSERT INTO kv (key, value) VALUES (?, ?) \
                ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )
            .bind(*key)
            .bind(*value)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to write key '{key}'"))?;
        }
        tx.commit().await.context("Failed to commit transaction")
    }
}
