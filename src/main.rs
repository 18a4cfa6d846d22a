use clap::Parser;
use expense_tracker::args::{Args, Command};
use expense_tracker::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expenses_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add_args) => commands::add(Config::load(home).await?, add_args.clone())
            .await?
            .print(),

        Command::Remove(remove_args) => {
            commands::remove(Config::load(home).await?, remove_args.clone())
                .await?
                .print()
        }

        Command::List(view_args) => commands::list(Config::load(home).await?, view_args.clone())
            .await?
            .print(),

        Command::Total(view_args) => {
            commands::total(Config::load(home).await?, view_args.clone())
                .await?
                .print()
        }

        Command::Summary(summary_args) => {
            commands::summary(Config::load(home).await?, summary_args.clone())
                .await?
                .print()
        }

        Command::Currency(currency_args) => {
            commands::currency(Config::load(home).await?, currency_args.clone())
                .await?
                .print()
        }

        Command::Export => commands::export(Config::load(home).await?).await?.print(),

        Command::Import(import_args) => {
            commands::import(Config::load(home).await?, import_args.clone())
                .await?
                .print()
        }

        Command::Clear => commands::clear(Config::load(home).await?).await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "expense_tracker={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
