//! Local reactive store
//!
//! A [`CollectionStore`] holds the last fetched collection for one view.
//! Every change bumps a revision published on a `watch` channel so
//! observers can re-read the snapshot.

use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aula_core::reconcile::{self, Keyed, Placement};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::scope::ViewScope;

/// Lock, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Never fetched
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; the previous collection is kept
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Already loading, or already loaded and not forced
    Skipped,
    /// The view closed before the response arrived
    Discarded,
}

struct StoreState<T> {
    items: Vec<Arc<T>>,
    status: LoadStatus,
    error: Option<String>,
}

pub struct CollectionStore<T> {
    name: &'static str,
    state: Mutex<StoreState<T>>,
    revision: watch::Sender<u64>,
}

impl<T: Keyed> CollectionStore<T> {
    pub fn new(name: &'static str) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            name,
            state: Mutex::new(StoreState {
                items: Vec::new(),
                status: LoadStatus::Idle,
                error: None,
            }),
            revision,
        }
    }

    pub fn snapshot(&self) -> Vec<Arc<T>> {
        lock(&self.state).items.clone()
    }

    pub fn get(&self, key: T::Key) -> Option<Arc<T>> {
        lock(&self.state)
            .items
            .iter()
            .find(|item| item.key() == key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> LoadStatus {
        lock(&self.state).status
    }

    pub fn is_loading(&self) -> bool {
        self.status() == LoadStatus::Loading
    }

    /// Message of the last failed fetch, cleared by the next success
    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// First fetch for the view; a no-op once loading or loaded
    pub async fn activate<F, Fut, E>(&self, scope: &ViewScope, fetch: F) -> Result<LoadOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<T>, E>>,
        E: Into<AppError>,
    {
        self.load(scope, false, fetch).await
    }

    /// User-requested re-fetch; a no-op while loading
    pub async fn refresh<F, Fut, E>(&self, scope: &ViewScope, fetch: F) -> Result<LoadOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<T>, E>>,
        E: Into<AppError>,
    {
        self.load(scope, true, fetch).await
    }

    async fn load<F, Fut, E>(&self, scope: &ViewScope, force: bool, fetch: F) -> Result<LoadOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<T>, E>>,
        E: Into<AppError>,
    {
        let previous = {
            let mut state = lock(&self.state);
            let allowed = match state.status {
                LoadStatus::Loading => false,
                LoadStatus::Idle => true,
                LoadStatus::Ready | LoadStatus::Failed => force,
            };
            if !allowed {
                debug!(store = self.name, status = ?state.status, "Fetch skipped");
                return Ok(LoadOutcome::Skipped);
            }
            std::mem::replace(&mut state.status, LoadStatus::Loading)
        };
        self.bump();
        let mut pending = PendingLoad {
            store: self,
            previous: Some(previous),
        };

        let Some(result) = scope.run(fetch()).await else {
            drop(pending);
            debug!(store = self.name, "Fetch discarded, view closed");
            return Ok(LoadOutcome::Discarded);
        };
        pending.previous = None;

        match result {
            Ok(items) => {
                {
                    let mut state = lock(&self.state);
                    state.items = items.into_iter().map(Arc::new).collect();
                    state.status = LoadStatus::Ready;
                    state.error = None;
                    debug!(store = self.name, count = state.items.len(), "Collection loaded");
                }
                self.bump();
                Ok(LoadOutcome::Loaded)
            }
            Err(e) => {
                let err: AppError = e.into();
                warn!(store = self.name, error = %err, "Fetch failed");
                {
                    let mut state = lock(&self.state);
                    state.status = LoadStatus::Failed;
                    state.error = Some(err.user_message());
                }
                self.bump();
                Err(err)
            }
        }
    }

    /// Splice a server-confirmed entity in; new ones go to the front
    pub fn upsert(&self, item: T) -> Arc<T> {
        let stored = {
            let mut state = lock(&self.state);
            let index = match reconcile::upsert(&mut state.items, item) {
                Placement::Replaced(index) => index,
                Placement::Prepended => 0,
            };
            Arc::clone(&state.items[index])
        };
        self.bump();
        stored
    }

    /// Splice a batch in with a single revision
    pub fn reconcile(&self, items: Vec<T>) -> usize {
        let replaced = reconcile::reconcile_batch(&mut lock(&self.state).items, items);
        if replaced > 0 {
            self.bump();
        }
        replaced
    }

    pub fn remove(&self, key: T::Key) -> Option<Arc<T>> {
        let removed = reconcile::remove(&mut lock(&self.state).items, key);
        if removed.is_some() {
            self.bump();
        }
        removed
    }
}

/// Puts the pre-fetch status back if a load ends without a result,
/// either through a closed scope or because its future was dropped.
struct PendingLoad<'a, T> {
    store: &'a CollectionStore<T>,
    previous: Option<LoadStatus>,
}

impl<T> Drop for PendingLoad<'_, T> {
    fn drop(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        {
            let mut state = lock(&self.store.state);
            if state.status == LoadStatus::Loading {
                state.status = previous;
            }
        }
        self.store.revision.send_modify(|rev| *rev += 1);
    }
}

/// Double-submission guard for controls.
///
/// Gates the control, not the gateway: while a key is held, another
/// submission for it is refused.
pub struct InFlight<K> {
    active: Mutex<HashSet<K>>,
}

impl<K: Copy + Eq + Hash> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
        }
    }
}

impl<K: Copy + Eq + Hash> InFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `Busy` when it is already claimed
    pub fn begin(&self, key: K) -> Result<InFlightGuard<'_, K>> {
        if lock(&self.active).insert(key) {
            Ok(InFlightGuard { owner: self, key })
        } else {
            Err(AppError::Busy)
        }
    }

    pub fn contains(&self, key: K) -> bool {
        lock(&self.active).contains(&key)
    }

    pub fn is_idle(&self) -> bool {
        lock(&self.active).is_empty()
    }
}

/// Releases its key on drop
pub struct InFlightGuard<'a, K: Copy + Eq + Hash> {
    owner: &'a InFlight<K>,
    key: K,
}

impl<K: Copy + Eq + Hash> Drop for InFlightGuard<'_, K> {
    fn drop(&mut self) {
        lock(&self.owner.active).remove(&self.key);
    }
}
