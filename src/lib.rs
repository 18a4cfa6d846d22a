//! Expense tracking: record expenses in several currencies, view them a month and a currency at a
//! time, and back the data up to a JSON file.
//!
//! `ExpenseStore` holds the state and is the entry point for changes. It persists through
//! `Storage`, which is backed by SQLite in the expenses home directory described by `Config`.

pub mod args;
mod backup;
pub mod commands;
mod config;
mod db;
mod error;
pub mod export;
pub mod import;
pub mod model;
pub mod storage;
pub mod store;
mod utils;
pub mod view;

#[cfg(test)]
mod test;

pub use backup::Backup;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use storage::Storage;
pub use store::ExpenseStore;
