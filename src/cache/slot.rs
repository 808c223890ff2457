//! Typed query slots with shared in-flight fetches.
//!
//! One slot holds the resident result of one query. Concurrent callers of
//! a cold or stale slot share a single in-flight request; a staleness mark
//! during the flight keeps the landed value stale so the next caller
//! fetches again.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use metrics::counter;
use tracing::{debug, warn};

use crate::infra::ApiError;
use crate::util::lock::mutex_lock;

use super::keys::QueryKey;
use super::registry::TagIndex;

const SOURCE: &str = "cache::slot";

type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<T>, ApiError>>>;

struct InFlight<T> {
    epoch: u64,
    fetch: SharedFetch<T>,
}

struct SlotState<T> {
    value: Option<Arc<T>>,
    stale: bool,
    /// Bumped on every staleness mark so a fetch started before an
    /// invalidation cannot land as fresh.
    epoch: u64,
    inflight: Option<InFlight<T>>,
}

pub(crate) struct QuerySlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T: Send + Sync + 'static> QuerySlot<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SlotState {
                value: None,
                stale: false,
                epoch: 0,
                inflight: None,
            }),
        })
    }

    /// Mark the resident value stale. Returns true when a value was
    /// resident; in-flight fetches started before this call will land
    /// already-stale.
    pub fn mark_stale(&self) -> bool {
        let mut state = mutex_lock(&self.state, SOURCE, "mark_stale");
        state.epoch += 1;
        let had_value = state.value.is_some();
        if had_value {
            state.stale = true;
        }
        had_value
    }

    /// Resident value, fresh or stale.
    #[cfg(test)]
    pub fn peek(&self) -> Option<Arc<T>> {
        mutex_lock(&self.state, SOURCE, "peek").value.clone()
    }

    #[cfg(test)]
    pub fn is_stale(&self) -> bool {
        mutex_lock(&self.state, SOURCE, "is_stale").stale
    }

    /// Return the resident value, or fetch it — joining an already
    /// in-flight request instead of issuing a duplicate.
    ///
    /// The fetch closure is invoked once per actual network round-trip.
    /// Dropping one caller does not cancel the shared request for the
    /// others. Fetch errors propagate to every waiter and leave the prior
    /// resident value (if any) in place.
    pub async fn fetch_or_join<F>(
        self: &Arc<Self>,
        key: &QueryKey,
        index: &Arc<TagIndex>,
        fetch: F,
    ) -> Result<Arc<T>, ApiError>
    where
        F: Fn() -> BoxFuture<'static, Result<T, ApiError>>,
    {
        loop {
            let shared = {
                let mut state = mutex_lock(&self.state, SOURCE, "fetch_or_join");
                if let Some(value) = &state.value {
                    if !state.stale {
                        counter!("subdesk_cache_hit_total").increment(1);
                        return Ok(value.clone());
                    }
                }
                match &state.inflight {
                    Some(inflight) => inflight.fetch.clone(),
                    None => {
                        counter!("subdesk_cache_miss_total").increment(1);
                        let started_epoch = state.epoch;
                        let shared = Self::spawn_fetch(
                            self.clone(),
                            key.clone(),
                            index.clone(),
                            fetch(),
                            started_epoch,
                        );
                        state.inflight = Some(InFlight {
                            epoch: started_epoch,
                            fetch: shared.clone(),
                        });
                        shared
                    }
                }
            };

            shared.await?;
            // Loop: the landed value may already be stale if a mutation
            // settled during the flight.
        }
    }

    fn spawn_fetch(
        slot: Arc<Self>,
        key: QueryKey,
        index: Arc<TagIndex>,
        fetch: BoxFuture<'static, Result<T, ApiError>>,
        started_epoch: u64,
    ) -> SharedFetch<T> {
        async move {
            let result = fetch.await;
            slot.complete(started_epoch, &key, &index, result)
        }
        .boxed()
        .shared()
    }

    fn complete(
        self: &Arc<Self>,
        started_epoch: u64,
        key: &QueryKey,
        index: &Arc<TagIndex>,
        result: Result<T, ApiError>,
    ) -> Result<Arc<T>, ApiError> {
        let mut state = mutex_lock(&self.state, SOURCE, "complete");
        state.inflight = None;
        match result {
            Ok(value) => {
                let value = Arc::new(value);
                state.value = Some(value.clone());
                state.stale = state.epoch != started_epoch;
                let landed_stale = state.stale;
                drop(state);
                index.register(key.clone(), key.tags().iter().copied());
                debug!(query = %key, landed_stale, "Query result stored");
                Ok(value)
            }
            Err(err) => {
                drop(state);
                warn!(query = %key, error = %err, "Query fetch failed");
                Err(err)
            }
        }
    }
}
