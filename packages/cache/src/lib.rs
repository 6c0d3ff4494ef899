#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Per-source venue collection cache.
//!
//! Wraps each [`VenueSource`] adapter behind a process-lifetime cache with
//! independent staleness windows. Consumers read with the non-blocking
//! [`VenueCache::get`]; a stale or missing entry schedules a background
//! refetch while the previous value (or an empty placeholder) stays
//! readable. At most one refetch per source is in flight at a time, and
//! in-flight refetches are never cancelled: they complete and populate the
//! entry for later readers.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tri_map_source::VenueSource;
use tri_map_venue_models::{SourceId, VenueCollection};

/// Refresh policy for one source.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Maximum age of a cached collection before a refetch is triggered.
    pub staleness: Duration,
}

impl CachePolicy {
    /// Default staleness windows: short for the dynamic places aggregator,
    /// a bit longer for bike-share stations, a day for slow-changing
    /// infrastructure data.
    #[must_use]
    pub fn default_for(source: SourceId) -> Self {
        let staleness = match source {
            SourceId::GooglePlaces => Duration::hours(2),
            SourceId::Encicla => Duration::hours(3),
            SourceId::InderVenues
            | SourceId::Ciclorrutas
            | SourceId::CicloviasInder
            | SourceId::MetroStations => Duration::hours(24),
        };
        Self { staleness }
    }
}

/// A cached collection with its fetch timestamp.
struct Entry {
    collection: VenueCollection,
    fetched_at: DateTime<Utc>,
}

/// Mutable cache state behind one lock: the entry table plus the set of
/// sources with a refetch currently in flight.
#[derive(Default)]
struct State {
    entries: HashMap<SourceId, Entry>,
    in_flight: HashSet<SourceId>,
}

/// Injectable per-source cache, constructed once per process and shared by
/// reference (`Arc`) with every consumer.
pub struct VenueCache {
    sources: HashMap<SourceId, Arc<dyn VenueSource>>,
    policies: HashMap<SourceId, CachePolicy>,
    state: Mutex<State>,
}

impl VenueCache {
    /// Builds the cache over the given adapters with default policies.
    #[must_use]
    pub fn new(sources: Vec<Box<dyn VenueSource>>) -> Self {
        let sources: HashMap<SourceId, Arc<dyn VenueSource>> = sources
            .into_iter()
            .map(|s| (s.source_id(), Arc::from(s)))
            .collect();
        let policies = sources
            .keys()
            .map(|&id| (id, CachePolicy::default_for(id)))
            .collect();
        Self {
            sources,
            policies,
            state: Mutex::new(State::default()),
        }
    }

    /// Overrides the policy for one source.
    #[must_use]
    pub fn with_policy(mut self, source: SourceId, policy: CachePolicy) -> Self {
        self.policies.insert(source, policy);
        self
    }

    /// Synchronous read of the latest cached collection for `source`.
    ///
    /// Returns an empty placeholder when nothing has been fetched yet. If
    /// the entry is absent or older than its staleness threshold and no
    /// refetch is in flight, one is scheduled in the background; the caller
    /// never blocks on network I/O.
    #[must_use]
    pub fn get(self: &Arc<Self>, source: SourceId) -> VenueCollection {
        let mut state = self.lock_state();

        let (value, wants_refresh) = match state.entries.get(&source) {
            Some(entry) => (entry.collection.clone(), self.is_stale(source, entry)),
            None => (VenueCollection::empty(source), true),
        };

        if wants_refresh && state.in_flight.insert(source) {
            drop(state);
            let cache = Arc::clone(self);
            tokio::spawn(async move {
                cache.run_refresh(source).await;
            });
        }

        value
    }

    /// Awaitable refresh of one source. A no-op when a refetch for the
    /// source is already in flight (that result is reused instead).
    pub async fn refresh(&self, source: SourceId) {
        if !self.lock_state().in_flight.insert(source) {
            return;
        }
        self.run_refresh(source).await;
    }

    /// Refreshes every configured source, fetches running concurrently.
    pub async fn refresh_all(&self) {
        let ids: Vec<SourceId> = self.sources.keys().copied().collect();
        futures::future::join_all(ids.into_iter().map(|id| self.refresh(id))).await;
    }

    /// Age check against the source's staleness window.
    fn is_stale(&self, source: SourceId, entry: &Entry) -> bool {
        let policy = self
            .policies
            .get(&source)
            .copied()
            .unwrap_or_else(|| CachePolicy::default_for(source));
        Utc::now() - entry.fetched_at > policy.staleness
    }

    /// Runs one refetch. The caller must already hold the in-flight slot
    /// for `source`; it is released here after the entry is stored.
    async fn run_refresh(&self, source: SourceId) {
        let Some(adapter) = self.sources.get(&source) else {
            log::error!("no adapter registered for source {source}");
            self.lock_state().in_flight.remove(&source);
            return;
        };

        // Adapters are fail-open: fetch always yields a collection.
        let collection = adapter.fetch().await;
        log::debug!("cache refreshed {source}: {} features", collection.len());

        let mut state = self.lock_state();
        state.entries.insert(
            source,
            Entry {
                collection,
                fetched_at: Utc::now(),
            },
        );
        state.in_flight.remove(&source);
    }

    /// # Panics
    ///
    /// Panics if the state `Mutex` is poisoned.
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("cache state lock poisoned")
    }
}
