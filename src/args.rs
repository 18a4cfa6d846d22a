//! These structs provide the CLI interface for the expenses CLI.

use crate::model::{Currency, MonthPointer};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A command-line tool for tracking personal expenses.
///
/// Expenses are recorded with a description, an amount, a date and a currency, and are saved in
/// a small database in your expenses home directory. Listing and totals are shown one month and
/// one currency at a time. Amounts are never converted between currencies.
///
/// The first time you use the program, run `expenses init`. The store is seeded with a few sample
/// expenses so there is something to look at.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the expenses home directory, its configuration file and database.
    ///
    /// By default the directory is $HOME/expenses. Pass --expenses-home or set EXPENSES_HOME to put
    /// it somewhere else.
    Init,
    /// Record a new expense.
    Add(AddArgs),
    /// Remove an expense by its id. An id that does not exist is ignored.
    Remove(RemoveArgs),
    /// Show the expenses for one month in one currency.
    List(ViewArgs),
    /// Show the total for one month in one currency.
    Total(ViewArgs),
    /// Show the totals for each month of a year in one currency.
    Summary(SummaryArgs),
    /// Show the selected currency, or select a new one.
    Currency(CurrencyArgs),
    /// Write all saved expenses and the selected currency to the backup file in the expenses home
    /// directory.
    Export,
    /// Replace all saved expenses, and the selected currency if the file has one, with the
    /// contents of a backup file. The data being replaced is saved to the backups directory first.
    Import(ImportArgs),
    /// Delete all saved expenses and the selected currency.
    Clear,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where expense data and configuration is held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// Args for the `expenses add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// What the money was spent on.
    description: String,

    /// How much was spent, e.g. 12.50 or 1,250. Must not be negative.
    amount: String,

    /// The date of the expense as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The currency of the expense. Defaults to the selected currency.
    #[arg(long, value_enum, ignore_case = true)]
    currency: Option<Currency>,
}

impl AddArgs {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        date: Option<NaiveDate>,
        currency: Option<Currency>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            date,
            currency,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }
}

/// Args for the `expenses remove` command.
#[derive(Debug, Parser, Clone)]
pub struct RemoveArgs {
    /// The id of the expense, as shown by `expenses list`.
    id: String,
}

impl RemoveArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for the `expenses list` and `expenses total` commands.
#[derive(Debug, Parser, Clone, Default)]
pub struct ViewArgs {
    /// The month to show as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<MonthPointer>,

    /// The currency to show. Defaults to the selected currency.
    #[arg(long, value_enum, ignore_case = true)]
    currency: Option<Currency>,
}

impl ViewArgs {
    pub fn new(month: Option<MonthPointer>, currency: Option<Currency>) -> Self {
        Self { month, currency }
    }

    pub fn month(&self) -> Option<MonthPointer> {
        self.month
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }
}

/// Args for the `expenses summary` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SummaryArgs {
    /// The year to summarize. Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,

    /// The currency to summarize. Defaults to the selected currency.
    #[arg(long, value_enum, ignore_case = true)]
    currency: Option<Currency>,
}

impl SummaryArgs {
    pub fn new(year: Option<i32>, currency: Option<Currency>) -> Self {
        Self { year, currency }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }
}

/// Args for the `expenses currency` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct CurrencyArgs {
    /// The currency to select. When omitted, the selected currency is shown.
    #[arg(value_enum, ignore_case = true)]
    code: Option<Currency>,
}

impl CurrencyArgs {
    pub fn new(code: Option<Currency>) -> Self {
        Self { code }
    }

    pub fn code(&self) -> Option<Currency> {
        self.code
    }
}

/// Args for the `expenses import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The backup file to import, e.g. one written by `expenses export`.
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default expenses home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
