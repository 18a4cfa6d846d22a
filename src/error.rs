//! Error types used throughout the crate.
//!
//! Internally everything is an `anyhow::Error`. Command handlers tag their errors with an
//! `ErrorType` so that the message that reaches the user names the area that failed.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad area in which a user-facing error occurred.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The data directory or `config.json` could not be created or loaded.
    Config,
    /// The SQLite key-value store failed.
    Storage,
    /// The request itself was invalid, e.g. an amount that is not a number.
    Request,
    /// Writing the backup document failed.
    Export,
    /// Reading, parsing or applying a backup document failed.
    Import,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// Converts a fallible result into a crate `Result` whose outermost context names the
/// `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(format!("{error_type} error")))
    }
}
