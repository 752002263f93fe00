use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::errors::AppError;

type Cached = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<Cached, AppError>>>;

/// Identifies one fetch: the resource plus its exact query pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: &'static str,
    pub params: Vec<(String, String)>,
}

impl QueryKey {
    pub fn new(resource: &'static str, params: Vec<(String, String)>) -> Self {
        Self { resource, params }
    }
}

enum Slot {
    InFlight { id: u64, fetch: SharedFetch },
    Ready(Cached),
}

/// Request-dedup cache for list and detail fetches.
///
/// Identical concurrent fetches share a single request. Results stay cached
/// until [`QueryCache::invalidate`] drops their resource; a fetch that was
/// in flight during an invalidation still resolves for its waiters but is
/// not stored. Failures are never cached.
#[derive(Default)]
pub struct QueryCache {
    slots: Mutex<HashMap<QueryKey, Slot>>,
    next_id: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Arc<T>, AppError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let (id, shared) = {
            let mut slots = self.slots();
            match slots.get(&key) {
                Some(Slot::Ready(value)) => return downcast(value.clone()),
                Some(Slot::InFlight { id, fetch }) => {
                    log::debug!("Joining in-flight fetch for {}", key.resource);
                    (*id, fetch.clone())
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let request = fetch();
                    let shared = async move { request.await.map(|v| Arc::new(v) as Cached) }
                        .boxed()
                        .shared();
                    slots.insert(
                        key.clone(),
                        Slot::InFlight {
                            id,
                            fetch: shared.clone(),
                        },
                    );
                    (id, shared)
                }
            }
        };

        let result = shared.await;

        {
            let mut slots = self.slots();
            let owns_slot =
                matches!(slots.get(&key), Some(Slot::InFlight { id: current, .. }) if *current == id);
            if owns_slot {
                match &result {
                    Ok(value) => {
                        slots.insert(key, Slot::Ready(value.clone()));
                    }
                    Err(_) => {
                        slots.remove(&key);
                    }
                }
            }
        }

        downcast(result?)
    }

    /// Drops every cached or in-flight entry of `resource`.
    pub fn invalidate(&self, resource: &str) {
        let mut slots = self.slots();
        let before = slots.len();
        slots.retain(|key, _| key.resource != resource);
        log::debug!(
            "Invalidated {} cached queries for {}",
            before - slots.len(),
            resource
        );
    }

    pub fn clear(&self) {
        self.slots().clear();
    }

    pub fn is_cached(&self, key: &QueryKey) -> bool {
        matches!(self.slots().get(key), Some(Slot::Ready(_)))
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn downcast<T: Send + Sync + 'static>(value: Cached) -> Result<Arc<T>, AppError> {
    value
        .downcast::<T>()
        .map_err(|_| AppError::Decode("cached value has an unexpected type".to_string()))
}
