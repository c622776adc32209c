// Expense access object for /api/gastos

use std::sync::Arc;

use crate::error::{self, RequestFailure, EXPENSE_POLICY};
use crate::http_client::ApiHttpClient;
use crate::models::{Expense, ExpenseInput};

const BASE_PATH: &str = "/api/gastos";

pub struct ExpenseService {
    http: Arc<ApiHttpClient>,
}

impl ExpenseService {
    pub fn new(http: Arc<ApiHttpClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> error::Result<Vec<Expense>> {
        self.http
            .get(BASE_PATH)
            .await
            .map_err(|f| fail(f, "Failed to list expenses"))
    }

    pub async fn list_by_category(&self, category_id: &str) -> error::Result<Vec<Expense>> {
        self.http
            .get(&format!("{}/categoria/{}", BASE_PATH, category_id))
            .await
            .map_err(|f| fail(f, "Failed to list expenses for category"))
    }

    pub async fn get(&self, id: &str) -> error::Result<Expense> {
        self.http
            .get(&format!("{}/{}", BASE_PATH, id))
            .await
            .map_err(|f| fail(f, "Failed to fetch expense"))
    }

    /// `input.category_id` is sent as given; the server checks it exists
    pub async fn create(&self, input: &ExpenseInput) -> error::Result<Expense> {
        self.http
            .post(BASE_PATH, input)
            .await
            .map_err(|f| fail(f, "Failed to create expense"))
    }

    pub async fn update(&self, id: &str, input: &ExpenseInput) -> error::Result<Expense> {
        self.http
            .put(&format!("{}/{}", BASE_PATH, id), input)
            .await
            .map_err(|f| fail(f, "Failed to update expense"))
    }

    pub async fn delete(&self, id: &str) -> error::Result<()> {
        self.http
            .delete(&format!("{}/{}", BASE_PATH, id))
            .await
            .map_err(|f| fail(f, "Failed to delete expense"))
    }
}

fn fail(failure: RequestFailure, default_message: &str) -> error::ApiError {
    let err = error::normalize(failure, &EXPENSE_POLICY, default_message);
    tracing::debug!(kind = ?err.kind(), message = %err, "Expense request failed");
    err
}
