// Category access object for /api/categorias

use std::sync::Arc;

use crate::error::{self, RequestFailure, CATEGORY_POLICY};
use crate::http_client::ApiHttpClient;
use crate::models::{Category, CategoryInput};

const BASE_PATH: &str = "/api/categorias";

pub struct CategoryService {
    http: Arc<ApiHttpClient>,
}

impl CategoryService {
    pub fn new(http: Arc<ApiHttpClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> error::Result<Vec<Category>> {
        self.http
            .get(BASE_PATH)
            .await
            .map_err(|f| fail(f, "Failed to list categories"))
    }

    /// Single category with its expenses embedded
    pub async fn get(&self, id: &str) -> error::Result<Category> {
        self.http
            .get(&format!("{}/{}", BASE_PATH, id))
            .await
            .map_err(|f| fail(f, "Failed to fetch category"))
    }

    pub async fn create(&self, input: &CategoryInput) -> error::Result<Category> {
        self.http
            .post(BASE_PATH, input)
            .await
            .map_err(|f| fail(f, "Failed to create category"))
    }

    pub async fn update(&self, id: &str, input: &CategoryInput) -> error::Result<Category> {
        self.http
            .put(&format!("{}/{}", BASE_PATH, id), input)
            .await
            .map_err(|f| fail(f, "Failed to update category"))
    }

    /// The server refuses while expenses still reference the category
    pub async fn delete(&self, id: &str) -> error::Result<()> {
        self.http
            .delete(&format!("{}/{}", BASE_PATH, id))
            .await
            .map_err(|f| fail(f, "Failed to delete category"))
    }
}

fn fail(failure: RequestFailure, default_message: &str) -> error::ApiError {
    let err = error::normalize(failure, &CATEGORY_POLICY, default_message);
    tracing::debug!(kind = ?err.kind(), message = %err, "Category request failed");
    err
}
