use std::collections::HashMap;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::api::Page;
use crate::event::ApiResult;
use crate::search::PageKey;

/// A page fetch that any number of callers can await.
pub type PageFuture = Shared<BoxFuture<'static, ApiResult<Page>>>;

/// Request cache keyed by (term, page).
///
/// Every key maps to one shared exchange: callers asking for a key that is
/// in flight or already resolved get the same future back. Failed exchanges
/// are not served again, and [`RequestCache::invalidate`] forces the next
/// request for a key onto the network.
#[derive(Default)]
pub struct RequestCache {
    entries: HashMap<PageKey, PageFuture>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the exchange for `key`, starting one with `fetch` on a miss.
    pub fn get_or_fetch<F, Fut>(&mut self, key: &PageKey, fetch: F) -> PageFuture
    where
        F: FnOnce(PageKey) -> Fut,
        Fut: Future<Output = ApiResult<Page>> + Send + 'static,
    {
        if let Some(existing) = self.entries.get(key) {
            match existing.peek() {
                Some(Err(_)) => {
                    tracing::debug!(%key, "cached exchange failed, refetching");
                }
                Some(Ok(_)) => {
                    tracing::debug!(%key, "cache hit");
                    return existing.clone();
                }
                None => {
                    tracing::debug!(%key, "joining in-flight exchange");
                    return existing.clone();
                }
            }
        }

        tracing::debug!(%key, "cache miss");
        let exchange = fetch(key.clone()).boxed().shared();
        self.entries.insert(key.clone(), exchange.clone());
        exchange
    }

    /// Drop the entry for `key`. Returns whether one was present.
    pub fn invalidate(&mut self, key: &PageKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry whose term differs from `term` (all of them when no
    /// term is set). Returns how many were dropped.
    ///
    /// Callers already awaiting a dropped exchange keep their own handle.
    pub fn retain_term(&mut self, term: Option<&str>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| Some(key.term.as_str()) == term);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            tracing::debug!(dropped, ?term, "evicted other terms from cache");
        }
        dropped
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
