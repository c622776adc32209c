use std::sync::Arc;

use super::list::{self, ListStore};
use super::ActionResult;
use crate::http_client::ApiHttpClient;
use crate::models::{Category, CategoryInput};
use crate::resources::CategoryService;

/// Category list container
pub struct CategoryState {
    service: CategoryService,
    list: ListStore<Category>,
}

impl CategoryState {
    pub fn new(http: Arc<ApiHttpClient>) -> Self {
        Self::with_service(CategoryService::new(http))
    }

    pub fn with_service(service: CategoryService) -> Self {
        Self {
            service,
            list: ListStore::new(),
        }
    }

    pub async fn categories(&self) -> Vec<Category> {
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

    /// Tear down; completions arriving afterwards are ignored
    pub fn close(&self) {
        self.list.close()
    }

    pub async fn fetch_all(&self) -> ActionResult<Vec<Category>> {
        self.list.fetch(self.service.list()).await
    }

    /// Single lookup with embedded expenses; the list is not touched
    pub async fn fetch_one(&self, id: &str) -> ActionResult<Category> {
        self.list.mutate(self.service.get(id), |_, _| {}).await
    }

    pub async fn create(&self, input: &CategoryInput) -> ActionResult<Category> {
        let result = self
            .list
            .mutate(self.service.create(input), list::append)
            .await;
        if let ActionResult::Success(category) = &result {
            tracing::info!(id = %category.id, name = %category.name, "Category created");
        }
        result
    }

    pub async fn update(&self, id: &str, input: &CategoryInput) -> ActionResult<Category> {
        self.list
            .mutate(self.service.update(id, input), |items, category| {
                list::replace_by_id(items, category)
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> ActionResult<()> {
        let result = self
            .list
            .mutate(self.service.delete(id), |items, _| list::remove_by_id(items, id))
            .await;
        if result.is_success() {
            tracing::info!(id = %id, "Category deleted");
        }
        result
    }
}
