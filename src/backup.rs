//! Snapshots of the saved data, taken before an import replaces it.

use crate::model::BackupDocument;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;

/// Prefix for the snapshot taken right before an import overwrites the saved data.
pub const PRE_IMPORT: &str = "pre-import";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
///
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Saves `data` as a pretty-printed JSON file named `{prefix}.YYYY-MM-DD-NNN.json`, where NNN
    /// is a sequence number, then deletes the oldest files so that only `backup_copies` remain.
    ///
    /// Returns the path to the created backup file.
    pub async fn save_json(&self, prefix: &str, data: &BackupDocument) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(data).context("Failed to serialize backup")?;
        self.save_raw(prefix, &json).await
    }

    /// Like `save_json`, but writes `contents` exactly as given.
    pub async fn save_raw(&self, prefix: &str, contents: &str) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let path = self
            .backups_dir
            .join(format!("{prefix}.{date}-{seq:03}.{EXTENSION}"));

        utils::write_atomic(&path, contents).await?;

        self.rotate(prefix).await?;
        Ok(path)
    }

    /// Returns one more than the highest sequence number used today for `prefix`.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;
        for name in self.backup_names(prefix).await? {
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq + 1)
    }

    async fn rotate(&self, prefix: &str) -> Result<()> {
        // The name format sorts by date and then sequence number
        let mut names = self.backup_names(prefix).await?;
        names.sort();

        let to_delete = names.len().saturating_sub(self.backup_copies as usize);
        for name in names.into_iter().take(to_delete) {
            utils::remove(self.backups_dir.join(name)).await?;
        }
        Ok(())
    }

    async fn backup_names(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                names.push(name);
            }
        }
        Ok(names)
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Returns `None` if `filename` is not `{prefix}.{date}-NNN.json`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(&format!(".{EXTENSION}"))?
        .parse()
        .ok()
}

fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}
