use std::sync::Arc;

use super::list::{self, ListStore};
use super::ActionResult;
use crate::http_client::ApiHttpClient;
use crate::models::{Expense, ExpenseInput};
use crate::resources::ExpenseService;

/// Expense list container; newest records first
pub struct ExpenseState {
    service: ExpenseService,
    list: ListStore<Expense>,
}

impl ExpenseState {
    pub fn new(http: Arc<ApiHttpClient>) -> Self {
        Self::with_service(ExpenseService::new(http))
    }

    pub fn with_service(service: ExpenseService) -> Self {
        Self {
            service,
            list: ListStore::new(),
        }
    }

    pub async fn expenses(&self) -> Vec<Expense> {
        self.list.items().await
    }

    pub async fn loading(&self) -> bool {
        self.list.loading().await
    }

    pub async fn error(&self) -> Option<String> {
        self.list.error().await
    }

    pub async fn clear_error(&self) {
        self.list.clear_error().await
    }

    pub fn close(&self) {
        self.list.close()
    }

    /// Held expenses belonging to one category, in list order
    pub async fn by_category(&self, category_id: &str) -> Vec<Expense> {
        self.list
            .items()
            .await
            .into_iter()
            .filter(|e| e.category_id == category_id)
            .collect()
    }

    /// Sum of held amounts, optionally for one category
    pub async fn total(&self, category_id: Option<&str>) -> f64 {
        self.list
            .items()
            .await
            .iter()
            .filter(|e| category_id.map_or(true, |id| e.category_id == id))
            .map(|e| e.amount)
            .sum()
    }

    pub async fn fetch_all(&self) -> ActionResult<Vec<Expense>> {
        self.list.fetch(self.service.list()).await
    }

    /// Server-filtered list; returned to the caller, the held list is kept
    pub async fn load_by_category(&self, category_id: &str) -> ActionResult<Vec<Expense>> {
        self.list
            .track(self.service.list_by_category(category_id))
            .await
    }

    pub async fn fetch_one(&self, id: &str) -> ActionResult<Expense> {
        self.list.mutate(self.service.get(id), |_, _| {}).await
    }

    pub async fn create(&self, input: &ExpenseInput) -> ActionResult<Expense> {
        let result = self
            .list
            .mutate(self.service.create(input), list::prepend)
            .await;
        if let ActionResult::Success(expense) = &result {
            tracing::info!(id = %expense.id, amount = expense.amount, "Expense created");
        }
        result
    }

    pub async fn update(&self, id: &str, input: &ExpenseInput) -> ActionResult<Expense> {
        self.list
            .mutate(self.service.update(id, input), |items, expense| {
                list::replace_by_id(items, expense)
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> ActionResult<()> {
        let result = self
            .list
            .mutate(self.service.delete(id), |items, _| list::remove_by_id(items, id))
            .await;
        if result.is_success() {
            tracing::info!(id = %id, "Expense deleted");
        }
        result
    }
}
