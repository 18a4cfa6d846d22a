//! The expense store: the in-memory state that a front end renders, and the operations that
//! change it.
//!
//! Every mutation updates memory first and then persists through `Storage`. Persistence failures
//! are logged by `Storage` and never reach the caller, so memory stays the source of truth for
//! the rest of the session.

use crate::model::{
    add_months, sample_expenses, Amount, Currency, Expense, MonthPointer, NewExpense,
};
use crate::storage::Storage;
use crate::view;
use chrono::{Local, NaiveDate, Utc};
use std::str::FromStr;
use tracing::{debug, error, info};

#[derive(Debug)]
pub struct ExpenseStore {
    storage: Storage,
    expenses: Vec<Expense>,
    current_currency: Currency,
    current_date: NaiveDate,
    temp_date: NaiveDate,
    modal_visible: bool,
    date_picker_visible: bool,
    currency_picker_visible: bool,
    new_expense: NewExpense,
    is_loading: bool,
}

impl ExpenseStore {
    /// Creates an empty store positioned on today's date. Call `initialize` before using it.
    pub fn new(storage: Storage) -> Self {
        Self::new_at(storage, Local::now().date_naive())
    }

    /// Creates an empty store positioned on `today`.
    pub fn new_at(storage: Storage, today: NaiveDate) -> Self {
        Self {
            storage,
            expenses: Vec::new(),
            current_currency: Currency::default(),
            current_date: today,
            temp_date: today,
            modal_visible: false,
            date_picker_visible: false,
            currency_picker_visible: false,
            new_expense: NewExpense::default(),
            is_loading: true,
        }
    }

    /// Loads the saved expenses and currency. When nothing has been saved yet, the store is
    /// seeded with sample expenses and those are saved.
    ///
    /// If the saved expenses exist but can't be read, the store starts empty and the saved data
    /// is left alone.
    pub async fn initialize(&mut self) {
        self.is_loading = true;

        match self.storage.read_expenses().await {
            Ok(Some(saved)) if !saved.is_empty() => {
                debug!("Loaded {} saved expenses", saved.len());
                self.expenses = saved;
            }
            Ok(_) => {
                info!("No saved expenses, loading sample data");
                self.expenses = sample_expenses();
                self.storage.save_expenses(&self.expenses).await;
            }
            Err(e) => {
                error!("Failed to load data: {e:#}");
                self.expenses = Vec::new();
            }
        }

        self.load_currency().await;
        self.is_loading = false;
    }

    /// Re-reads the saved expenses and currency without seeding. Used after the saved data has
    /// been replaced, e.g. by an import.
    pub async fn refresh(&mut self) {
        self.is_loading = true;
        self.expenses = self.storage.get_expenses().await;
        self.load_currency().await;
        self.is_loading = false;
    }

    async fn load_currency(&mut self) {
        match self.storage.read_selected_currency().await {
            Ok(Some(currency)) => self.current_currency = currency,
            Ok(None) => {}
            Err(e) => error!("Failed to load currency: {e:#}"),
        }
    }

    /// Adds an expense to the front of the list and saves the list.
    ///
    /// Nothing happens, and `None` is returned, when `description` is blank or `amount_text` is
    /// not a non-negative number no larger than `Amount::limit()`.
    pub async fn add_expense(
        &mut self,
        description: &str,
        amount_text: &str,
        date: NaiveDate,
        currency: Currency,
    ) -> Option<&Expense> {
        if description.trim().is_empty() {
            debug!("Ignoring expense with an empty description");
            return None;
        }
        let amount = match Amount::from_str(amount_text) {
            Ok(amount) if !amount.is_negative() => amount,
            Ok(_) => {
                debug!("Ignoring expense with a negative amount '{amount_text}'");
                return None;
            }
            Err(e) => {
                debug!("Ignoring expense: {e}");
                return None;
            }
        };

        let expense = Expense::new(self.next_id(), description, amount, date, currency);
        debug!("Adding expense {}", expense.id());
        self.expenses.insert(0, expense);
        self.new_expense = NewExpense::default();
        self.modal_visible = false;
        self.storage.save_expenses(&self.expenses).await;
        self.expenses.first()
    }

    /// Adds an expense from the new-expense form using the current date and currency.
    pub async fn submit_new_expense(&mut self) -> Option<&Expense> {
        let NewExpense {
            description,
            amount,
        } = self.new_expense.clone();
        let date = self.current_date;
        let currency = self.current_currency;
        self.add_expense(&description, &amount, date, currency).await
    }

    /// Removes the expense with `id` and saves the list. An unknown id is not an error and saves
    /// nothing. Returns whether anything was removed.
    pub async fn remove_expense(&mut self, id: &str) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id() != id);
        if self.expenses.len() == before {
            debug!("No expense with id {id}");
            return false;
        }
        self.storage.save_expenses(&self.expenses).await;
        true
    }

    /// Changes the currency used for display and totals, and saves it.
    pub async fn set_current_currency(&mut self, currency: Currency) {
        self.current_currency = currency;
        self.currency_picker_visible = false;
        self.storage.save_selected_currency(currency).await;
    }

    pub fn set_current_date(&mut self, date: NaiveDate) {
        self.current_date = date;
    }

    /// Moves the displayed month by `delta` months.
    pub fn change_month(&mut self, delta: i32) {
        self.current_date = add_months(self.current_date, delta);
    }

    /// Removes everything that has been saved and empties the store.
    pub async fn clear_all_data(&mut self) -> bool {
        self.expenses.clear();
        self.current_currency = Currency::default();
        self.storage.clear_all_data().await
    }

    pub fn set_modal_visible(&mut self, visible: bool) {
        self.modal_visible = visible;
    }

    pub fn set_date_picker_visible(&mut self, visible: bool) {
        self.date_picker_visible = visible;
    }

    pub fn set_currency_picker_visible(&mut self, visible: bool) {
        self.currency_picker_visible = visible;
    }

    pub fn set_new_expense(&mut self, new_expense: NewExpense) {
        self.new_expense = new_expense;
    }

    pub fn set_temp_date(&mut self, date: NaiveDate) {
        self.temp_date = date;
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn current_currency(&self) -> Currency {
        self.current_currency
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn current_month(&self) -> MonthPointer {
        MonthPointer::of(self.current_date)
    }

    pub fn temp_date(&self) -> NaiveDate {
        self.temp_date
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn modal_visible(&self) -> bool {
        self.modal_visible
    }

    pub fn date_picker_visible(&self) -> bool {
        self.date_picker_visible
    }

    pub fn currency_picker_visible(&self) -> bool {
        self.currency_picker_visible
    }

    pub fn new_expense(&self) -> &NewExpense {
        &self.new_expense
    }

    /// The expenses in the current month and currency.
    pub fn visible_expenses(&self) -> Vec<Expense> {
        view::expenses_for_currency(
            &view::expenses_for_month(&self.expenses, self.current_month()),
            self.current_currency,
        )
    }

    /// The total of `visible_expenses`.
    pub fn visible_total(&self) -> Amount {
        view::total(&self.visible_expenses())
    }

    /// A millisecond timestamp, bumped until it is not already in use.
    fn next_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self.expenses.iter().any(|e| e.id() == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, EXPENSES_KEY};
    use crate::test::FailingStore;
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    async fn seeded() -> (Storage, ExpenseStore) {
        let storage = Storage::in_memory();
        let mut store = ExpenseStore::new_at(storage.clone(), date("2025-02-10"));
        store.initialize().await;
        (storage, store)
    }

    #[tokio::test]
    async fn test_initialize_seeds_and_persists() {
        let (storage, store) = seeded().await;
        assert!(!store.is_loading());
        assert_eq!(store.expenses().len(), 5);
        assert_eq!(store.current_currency(), Currency::Usd);
        assert_eq!(storage.get_expenses().await, sample_expenses());
        assert_eq!(
            store.visible_total(),
            Amount::from_str("105.00").unwrap()
        );
    }

    #[tokio::test]
    async fn test_initialize_loads_saved_data() {
        let storage = Storage::in_memory();
        let saved = vec![Expense::new(
            "42",
            "Rent",
            Amount::from_str("900").unwrap(),
            date("2025-02-01"),
            Currency::Eur,
        )];
        storage.save_expenses(&saved).await;
        storage.save_selected_currency(Currency::Eur).await;

        let mut store = ExpenseStore::new_at(storage, date("2025-02-10"));
        assert!(store.is_loading());
        store.initialize().await;
        assert!(!store.is_loading());
        assert_eq!(store.expenses(), saved.as_slice());
        assert_eq!(store.current_currency(), Currency::Eur);
    }

    #[tokio::test]
    async fn test_initialize_does_not_overwrite_corrupt_data() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(EXPENSES_KEY, "not json").await.unwrap();
        let mut store = ExpenseStore::new_at(Storage::new(kv.clone()), date("2025-02-10"));
        store.initialize().await;
        assert!(store.expenses().is_empty());
        assert!(!store.is_loading());
        assert_eq!(
            kv.get(EXPENSES_KEY).await.unwrap().as_deref(),
            Some("not json")
        );
    }

    #[tokio::test]
    async fn test_initialize_survives_storage_failure() {
        let mut store =
            ExpenseStore::new_at(Storage::new(Arc::new(FailingStore)), date("2025-02-10"));
        store.initialize().await;
        assert!(!store.is_loading());
        assert!(store.expenses().is_empty());
        assert_eq!(store.current_currency(), Currency::Usd);
    }

    #[tokio::test]
    async fn test_add_expense_valid() {
        let (storage, mut store) = seeded().await;
        let added = store
            .add_expense("Coffee", "3.50", date("2025-02-11"), Currency::Usd)
            .await
            .cloned()
            .unwrap();
        assert_eq!(added.description(), "Coffee");
        assert_eq!(added.amount(), Amount::from_str("3.5").unwrap());
        assert_eq!(added.date(), date("2025-02-11"));
        assert_eq!(added.currency(), Currency::Usd);

        assert_eq!(store.expenses().len(), 6);
        assert_eq!(store.expenses()[0], added);
        assert_eq!(storage.get_expenses().await.len(), 6);
    }

    #[tokio::test]
    async fn test_add_expense_invalid_is_noop() {
        let (storage, mut store) = seeded().await;
        let before = store.expenses().to_vec();
        for (description, amount) in [
            ("", "10"),
            ("   ", "10"),
            ("Lunch", "abc"),
            ("Lunch", ""),
            ("Lunch", "-5"),
        ] {
            let added = store
                .add_expense(description, amount, date("2025-02-11"), Currency::Usd)
                .await;
            assert!(added.is_none(), "{description:?} {amount:?}");
        }
        assert_eq!(store.expenses(), before.as_slice());
        assert_eq!(storage.get_expenses().await, before);
    }

    #[tokio::test]
    async fn test_add_expense_unique_ids() {
        let (_, mut store) = seeded().await;
        for i in 0..20 {
            store
                .add_expense("Snack", &format!("{i}"), date("2025-02-11"), Currency::Usd)
                .await;
        }
        let mut ids: Vec<&str> = store.expenses().iter().map(|e| e.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 25);
    }

    #[tokio::test]
    async fn test_submit_new_expense_uses_form_and_clears_it() {
        let (_, mut store) = seeded().await;
        store.set_current_currency(Currency::Gbp).await;
        store.set_modal_visible(true);
        store.set_new_expense(NewExpense::new("Train", "12.40"));

        let added = store.submit_new_expense().await.cloned().unwrap();
        assert_eq!(added.currency(), Currency::Gbp);
        assert_eq!(added.date(), date("2025-02-10"));
        assert!(store.new_expense().is_empty());
        assert!(!store.modal_visible());
    }

    #[tokio::test]
    async fn test_submit_invalid_form_keeps_it() {
        let (_, mut store) = seeded().await;
        store.set_modal_visible(true);
        store.set_new_expense(NewExpense::new("Train", "twelve"));
        assert!(store.submit_new_expense().await.is_none());
        assert_eq!(store.new_expense(), &NewExpense::new("Train", "twelve"));
        assert!(store.modal_visible());
    }

    #[tokio::test]
    async fn test_remove_expense() {
        let (storage, mut store) = seeded().await;
        assert!(store.remove_expense("3").await);
        assert_eq!(store.expenses().len(), 4);
        assert!(store.expenses().iter().all(|e| e.id() != "3"));
        assert_eq!(storage.get_expenses().await.len(), 4);
    }

    #[tokio::test]
    async fn test_remove_missing_expense_is_noop() {
        let (_, mut store) = seeded().await;
        let before = store.expenses().to_vec();
        assert!(!store.remove_expense("does-not-exist").await);
        assert_eq!(store.expenses(), before.as_slice());
    }

    #[tokio::test]
    async fn test_remove_missing_expense_keeps_unreadable_data() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(EXPENSES_KEY, "not json").await.unwrap();
        let mut store = ExpenseStore::new_at(Storage::new(kv.clone()), date("2025-02-10"));
        store.initialize().await;
        assert!(!store.remove_expense("no-such-id").await);
        assert_eq!(
            kv.get(EXPENSES_KEY).await.unwrap().as_deref(),
            Some("not json")
        );
    }

    #[tokio::test]
    async fn test_large_amount_survives_next_session() {
        let (storage, mut store) = seeded().await;
        for amount in ["999999999999.99", "12345678901.234567891"] {
            store
                .add_expense("Big", amount, date("2025-02-11"), Currency::Usd)
                .await
                .unwrap();
        }
        let too_large = "79228162514264337593543950335";
        assert!(store
            .add_expense("Bigger", too_large, date("2025-02-11"), Currency::Usd)
            .await
            .is_none());
        assert_eq!(
            store.visible_total().value().to_string(),
            "1012345679006.224567891"
        );

        let mut next = ExpenseStore::new_at(storage, date("2025-02-10"));
        next.initialize().await;
        assert_eq!(next.expenses(), store.expenses());
        assert_eq!(next.visible_total(), store.visible_total());
    }

    #[tokio::test]
    async fn test_set_current_currency_persists() {
        let (storage, mut store) = seeded().await;
        store.set_currency_picker_visible(true);
        store.set_current_currency(Currency::Sek).await;
        assert_eq!(store.current_currency(), Currency::Sek);
        assert!(!store.currency_picker_visible());
        assert_eq!(storage.get_selected_currency().await, Currency::Sek);
        assert_eq!(store.expenses().len(), 5);
    }

    #[tokio::test]
    async fn test_change_month() {
        let (_, mut store) = seeded().await;
        store.set_current_date(date("2024-12-31"));
        store.change_month(1);
        assert_eq!(store.current_month(), MonthPointer::new(2025, 1).unwrap());
        store.change_month(1);
        assert_eq!(store.current_date(), date("2025-02-28"));
        store.change_month(-1);
        assert_eq!(store.current_month(), MonthPointer::new(2025, 1).unwrap());
        store.change_month(-12);
        assert_eq!(store.current_month(), MonthPointer::new(2024, 1).unwrap());
    }

    #[tokio::test]
    async fn test_new_expense_hidden_until_view_matches() {
        let (_, mut store) = seeded().await;
        store.set_current_date(date("2025-02-10"));
        let before = store.visible_expenses();

        store
            .add_expense("Coffee", "3.50", date("2025-03-02"), Currency::Eur)
            .await;
        assert_eq!(store.visible_expenses(), before);

        store.change_month(1);
        assert!(store
            .visible_expenses()
            .iter()
            .all(|e| e.description() != "Coffee"));

        store.set_current_currency(Currency::Eur).await;
        let visible = store.visible_expenses();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].description(), "Coffee");
        assert_eq!(store.visible_total(), Amount::from_str("3.50").unwrap());
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_memory() {
        let mut store =
            ExpenseStore::new_at(Storage::new(Arc::new(FailingStore)), date("2025-02-10"));
        store.initialize().await;
        store
            .add_expense("Coffee", "3.50", date("2025-02-11"), Currency::Usd)
            .await;
        store.set_current_currency(Currency::Eur).await;
        assert_eq!(store.expenses().len(), 1);
        assert_eq!(store.current_currency(), Currency::Eur);
    }

    #[tokio::test]
    async fn test_refresh_reads_replaced_data() {
        let (storage, mut store) = seeded().await;
        storage.save_expenses(&[]).await;
        storage.save_selected_currency(Currency::Jpy).await;
        store.refresh().await;
        assert!(store.expenses().is_empty());
        assert_eq!(store.current_currency(), Currency::Jpy);
    }

    #[tokio::test]
    async fn test_clear_all_data() {
        let (storage, mut store) = seeded().await;
        store.set_current_currency(Currency::Eur).await;
        assert!(store.clear_all_data().await);
        assert!(store.expenses().is_empty());
        assert_eq!(store.current_currency(), Currency::Usd);
        assert_eq!(storage.read_expenses().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_flags_and_temp_date() {
        let (_, mut store) = seeded().await;
        store.set_date_picker_visible(true);
        store.set_temp_date(date("2025-01-01"));
        assert!(store.date_picker_visible());
        assert_eq!(store.temp_date(), date("2025-01-01"));
        assert_eq!(store.current_date(), date("2025-02-10"));
    }
}
