//! Authenticated resource resolution with de-duplication and failure
//! memoization.
//!
//! Screens hand the cache a resource key plus the id of the row that wants
//! to display it. The cache fetches each key at most once, converts the
//! bytes to a data URI and binds it to every owner that asked. A key whose
//! fetch failed is never retried until [`ResourceCache::reset`] (a list
//! refresh) clears the session state.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use log::{debug, warn};
use tokio::sync::Notify;

use bd_core::ids::{OwnerId, ResourceKey};
use bd_core::ports::FileTransferPort;

use crate::data_uri;

#[derive(Default)]
struct CacheState {
    /// Owner → resolved data URI. One binding per displayed row.
    resolved_owners: HashMap<OwnerId, String>,
    /// Key → data URI memo, so a later owner referencing an already
    /// fetched key is served without a network call.
    resolved_keys: HashMap<ResourceKey, String>,
    /// Keys currently being fetched, with the owners waiting on them.
    /// At most one outstanding request per key.
    in_flight: HashMap<ResourceKey, Vec<OwnerId>>,
    /// Keys whose fetch failed this session. Terminal until reset.
    failed: HashSet<ResourceKey>,
    /// Bumped by reset; completions from an older generation are dropped.
    generation: u64,
}

pub struct ResourceCache<T: FileTransferPort> {
    transport: T,
    state: Mutex<CacheState>,
    changed: Notify,
}

impl<T: FileTransferPort> ResourceCache<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Mutex::new(CacheState::default()),
            changed: Notify::new(),
        }
    }

    /// Resolves `key` for `owner`.
    ///
    /// No-op when the owner already has a URI, the key already failed, or
    /// the key is in flight (the owner is then attached to the pending
    /// request instead of issuing a new one). Failures are memoized, not
    /// surfaced: the row keeps rendering its placeholder.
    pub async fn resolve(&self, key: &ResourceKey, owner: &OwnerId) {
        let generation = {
            let mut state = self.lock();
            if key.is_empty() || state.resolved_owners.contains_key(owner) {
                return;
            }
            if state.failed.contains(key) {
                return;
            }
            if let Some(uri) = state.resolved_keys.get(key) {
                let uri = uri.clone();
                state.resolved_owners.insert(owner.clone(), uri);
                drop(state);
                self.changed.notify_waiters();
                return;
            }
            if let Some(waiters) = state.in_flight.get_mut(key) {
                if !waiters.contains(owner) {
                    waiters.push(owner.clone());
                }
                return;
            }
            state.in_flight.insert(key.clone(), vec![owner.clone()]);
            state.generation
        };

        debug!("fetching resource {}", key);
        let result = self.transport.fetch_resource(key).await;

        let mut state = self.lock();
        if state.generation != generation {
            // The cache was reset while the fetch was out; the waiters
            // belong to a screen state that no longer exists.
            return;
        }
        let waiters = state.in_flight.remove(key).unwrap_or_default();
        match result {
            Ok(fetched) => {
                let uri = data_uri::encode(&fetched, key);
                state.resolved_keys.insert(key.clone(), uri.clone());
                for waiter in waiters {
                    state.resolved_owners.insert(waiter, uri.clone());
                }
            }
            Err(err) => {
                warn!("resource {} failed to resolve: {}", key, err);
                state.failed.insert(key.clone());
            }
        }
        drop(state);
        self.changed.notify_waiters();
    }

    pub fn uri_for(&self, owner: &OwnerId) -> Option<String> {
        self.lock().resolved_owners.get(owner).cloned()
    }

    pub fn is_in_flight(&self, key: &ResourceKey) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    pub fn is_failed(&self, key: &ResourceKey) -> bool {
        self.lock().failed.contains(key)
    }

    /// Discards all cache state, including failure memoization. In-flight
    /// fetches keep running but their completions are dropped.
    pub fn reset(&self) {
        let mut state = self.lock();
        *state = CacheState {
            generation: state.generation + 1,
            ..CacheState::default()
        };
        drop(state);
        self.changed.notify_waiters();
    }

    /// Waits until the next state transition, for reactive callers.
    pub async fn changed(&self) {
        self.changed.notified().await;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
