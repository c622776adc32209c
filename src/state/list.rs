// Shared list container
// Holds the last-known records, the loading flag and the last error.
// List fetches are numbered so only the most recently issued one may
// replace the records; anything that completes after `close()` is dropped.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{ActionResult, InFlight};
use crate::error::ApiError;
use crate::models::Identified;

struct Inner<T> {
    items: Vec<T>,
    error: Option<String>,

    /// Number of the most recently issued list fetch
    generation: u64,
}

pub struct ListStore<T> {
    inner: RwLock<Inner<T>>,

    /// Actions currently toggling `loading`
    in_flight: AtomicUsize,
    closed: AtomicBool,
}

impl<T> Default for ListStore<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: Vec::new(),
                error: None,
                generation: 0,
            }),
            in_flight: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }
}

impl<T: Clone + Identified> ListStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn items(&self) -> Vec<T> {
        self.inner.read().await.items.clone()
    }

    pub async fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.inner.write().await.error = None;
    }

    /// Stop applying completions; in-flight requests still run to the end
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Run a list fetch and replace the records with its result
    pub async fn fetch<F>(&self, request: F) -> ActionResult<Vec<T>>
    where
        F: Future<Output = Result<Vec<T>, ApiError>>,
    {
        let _loading = InFlight::enter(&self.in_flight);
        let generation = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.error = None;
            inner.generation
        };

        let result = request.await;

        let mut inner = self.inner.write().await;
        if self.is_closed() {
            return result.into();
        }
        if inner.generation != generation {
            tracing::debug!(
                generation,
                latest = inner.generation,
                "Discarding superseded list response"
            );
            return result.into();
        }

        match result {
            Ok(items) => {
                inner.items = items.clone();
                ActionResult::Success(items)
            }
            Err(e) => {
                inner.error = Some(e.to_string());
                ActionResult::Failure(e.to_string())
            }
        }
    }

    /// Run a request that toggles `loading` but leaves the records alone
    pub async fn track<R, F>(&self, request: F) -> ActionResult<R>
    where
        F: Future<Output = Result<R, ApiError>>,
    {
        let _loading = InFlight::enter(&self.in_flight);
        self.inner.write().await.error = None;

        let result = request.await;

        let mut inner = self.inner.write().await;
        if let Err(e) = &result {
            if !self.is_closed() {
                inner.error = Some(e.to_string());
            }
        }
        result.into()
    }

    /// Run a request without touching `loading` and fold its success into
    /// the records with `apply`
    pub async fn mutate<R, F, A>(&self, request: F, apply: A) -> ActionResult<R>
    where
        F: Future<Output = Result<R, ApiError>>,
        A: FnOnce(&mut Vec<T>, &R),
    {
        let result = request.await;

        if self.is_closed() {
            return result.into();
        }

        let mut inner = self.inner.write().await;
        match &result {
            Ok(value) => apply(&mut inner.items, value),
            Err(e) => inner.error = Some(e.to_string()),
        }
        result.into()
    }
}

pub fn append<T: Clone>(items: &mut Vec<T>, record: &T) {
    items.push(record.clone());
}

pub fn prepend<T: Clone>(items: &mut Vec<T>, record: &T) {
    items.insert(0, record.clone());
}

/// Replace the record with the same id in place; no-op when absent
pub fn replace_by_id<T: Clone + Identified>(items: &mut [T], record: &T) {
    if let Some(slot) = items.iter_mut().find(|item| item.id() == record.id()) {
        *slot = record.clone();
    }
}

pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) {
    if let Some(pos) = items.iter().position(|item| item.id() == id) {
        items.remove(pos);
    }
}
