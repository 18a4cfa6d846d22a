use crate::args::CurrencyArgs;
use crate::commands::{load_store, Out};
use crate::model::Currency;
use crate::{Config, Result};

/// Shows the selected currency or, when a code is given, selects and saves it.
pub async fn currency(config: Config, args: CurrencyArgs) -> Result<Out<Currency>> {
    let mut store = load_store(&config).await;
    let message = match args.code() {
        Some(code) => {
            store.set_current_currency(code).await;
            format!("Selected currency is now {} ({})", code, code.symbol())
        }
        None => {
            let current = store.current_currency();
            format!("Selected currency is {} ({})", current, current.symbol())
        }
    };
    Ok(Out::new(message, store.current_currency()))
}
