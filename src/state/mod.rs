// State containers
// In-memory view of the session, categories and expenses that the UI
// layer reads from. Actions never return errors: failures are recorded on
// the container and reported as `ActionResult::Failure`.

mod auth;
mod categories;
mod expenses;
pub mod list;

pub use auth::AuthState;
pub use categories::CategoryState;
pub use expenses::ExpenseState;

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ApiError;
use crate::models::{Category, Expense};

/// Counts an action as in flight until dropped
///
/// Dropping the action future mid-request still releases the count, so
/// `loading` cannot stay stuck.
pub(crate) struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    pub(crate) fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Outcome of a container action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Success(T),
    Failure(String),
}

impl<T> ActionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    pub fn data(self) -> Option<T> {
        match self {
            ActionResult::Success(data) => Some(data),
            ActionResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActionResult::Success(_) => None,
            ActionResult::Failure(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            ActionResult::Success(data) => Ok(data),
            ActionResult::Failure(message) => Err(message),
        }
    }
}

impl<T> From<Result<T, ApiError>> for ActionResult<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => ActionResult::Success(data),
            Err(e) => ActionResult::Failure(e.to_string()),
        }
    }
}

/// Refresh categories and expenses concurrently
///
/// Returns once both fetches have completed, so the combined loading state
/// (`categories.loading() || expenses.loading()`) is clear on return.
pub async fn refresh_all(
    categories: &CategoryState,
    expenses: &ExpenseState,
) -> (ActionResult<Vec<Category>>, ActionResult<Vec<Expense>>) {
    tracing::debug!("Refreshing categories and expenses");
    tokio::join!(categories.fetch_all(), expenses.fetch_all())
}
