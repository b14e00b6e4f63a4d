//! Version-checked stats cache with single-flight recompute
//!
//! Serves [`StatsSnapshot`]s computed from the dataset store. A snapshot is
//! valid while its source version token still equals the store's current
//! one; any write moves the token and the next `get` recomputes.
//!
//! Concurrent misses converge on one shared refresh future: every caller
//! that arrives during a refresh awaits the same boxed future and receives
//! the same result, success or failure. A busy flag that lets racing
//! callers read an absent or half-written snapshot is exactly the defect
//! this replaces.

use crate::error::CoreError;
use crate::models::StatsSnapshot;
use crate::stats::aggregate;
use crate::store::{DatasetStore, VersionToken};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Cloneable refresh failure, fanned out to every waiter of a flight.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
struct RefreshError {
    message: String,
}

type Flight = Shared<BoxFuture<'static, Result<StatsSnapshot, RefreshError>>>;

/// Process-lifetime cache state, owned exclusively by [`StatsCache`].
#[derive(Default)]
struct CacheState {
    /// Last successfully computed snapshot, kept across failed refreshes.
    snapshot: Option<StatsSnapshot>,
    /// Dataset version the snapshot was computed from. `None` when the
    /// version token was unreadable at refresh time, which can never
    /// satisfy a hit check.
    source_version: Option<VersionToken>,
    /// The one refresh currently executing, if any.
    in_flight: Option<Flight>,
}

/// Compute-once, invalidate-on-change statistics cache.
///
/// Constructed empty; the first `get` populates it.
pub struct StatsCache<S> {
    store: Arc<S>,
    state: Arc<Mutex<CacheState>>,
}

impl<S: DatasetStore> StatsCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    /// Get the current stats snapshot, recomputing if the dataset changed.
    ///
    /// Cache hits cost one version-token read and a short lock, no dataset
    /// I/O. On a miss the caller either becomes the refresher or joins the
    /// refresh already in flight. A failed refresh propagates to all
    /// waiters and leaves the previous snapshot intact; there is no retry
    /// here.
    pub async fn get(&self) -> Result<StatsSnapshot, CoreError> {
        let version = match self.store.version_token().await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "Version token unavailable, forcing recompute");
                None
            }
        };

        let flight = {
            let mut state = self.state.lock();

            if let (Some(snapshot), Some(cached)) = (&state.snapshot, state.source_version) {
                if Some(cached) == version {
                    debug!("Stats cache hit");
                    return Ok(snapshot.clone());
                }
            }

            match &state.in_flight {
                Some(flight) => {
                    debug!("Joining in-flight stats refresh");
                    flight.clone()
                }
                None => {
                    let flight =
                        Self::refresh(Arc::clone(&self.store), Arc::clone(&self.state), version)
                            .boxed()
                            .shared();
                    state.in_flight = Some(flight.clone());
                    flight
                }
            }
        };

        flight
            .await
            .map_err(|e| CoreError::StatsRefresh { message: e.message })
    }

    /// The single refresh execution behind a flight.
    ///
    /// `version` is the token read before the collection, so a write that
    /// lands mid-refresh leaves the stored snapshot one version behind and
    /// the next `get` recomputes.
    async fn refresh(
        store: Arc<S>,
        state: Arc<Mutex<CacheState>>,
        version: Option<VersionToken>,
    ) -> Result<StatsSnapshot, RefreshError> {
        let result = store.read_all().await.map(|items| aggregate(&items));

        let mut state = state.lock();
        state.in_flight = None;

        match result {
            Ok(snapshot) => {
                state.snapshot = Some(snapshot.clone());
                state.source_version = version;
                debug!(count = snapshot.count, "Stats recomputed");
                Ok(snapshot)
            }
            Err(e) => {
                // Previous snapshot, if any, stays in place for later calls.
                warn!(error = %e, "Stats refresh failed");
                Err(RefreshError {
                    message: e.to_string(),
                })
            }
        }
    }
}
