//! Paginated list controller
//!
//! State machine behind an infinite-scroll item list. Pages accumulate into
//! one growing list; a new query starts a new generation and everything
//! belonging to an older generation is dropped on arrival, whether it
//! settled, failed, or was cancelled. The generation check is the
//! authoritative race resolution: a cancellation token frees the network
//! promptly, but a cancelled-yet-settled response is rejected the same way
//! a late one is.

use crate::gateway::{GatewayError, ItemsGateway};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use wares_core::Item;

/// How close to the end of the loaded list the visible range may get
/// before the next page is requested.
pub const SCROLL_LOOKAHEAD: usize = 5;

/// The one request currently on the wire for the live generation.
struct InFlight {
    id: u64,
    cancel: CancellationToken,
}

struct ListState {
    items: Vec<Item>,
    total: usize,
    page: u32,
    page_size: u32,
    query: String,
    loading: bool,
    has_more: bool,
    generation: u64,
    next_request_id: u64,
    in_flight: Option<InFlight>,
}

/// Cloned view of the controller state for rendering.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub items: Vec<Item>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub query: String,
    pub loading: bool,
    pub has_more: bool,
}

/// Client-side list controller; one instance per mounted list view.
///
/// Owns its state exclusively. Dropping the controller (or calling
/// [`cancel_in_flight`](Self::cancel_in_flight) on unmount) aborts the
/// outstanding request.
pub struct ListController<G> {
    gateway: Arc<G>,
    state: Mutex<ListState>,
}

impl<G: ItemsGateway> ListController<G> {
    pub fn new(gateway: Arc<G>, page_size: u32) -> Self {
        Self {
            gateway,
            state: Mutex::new(ListState {
                items: Vec::new(),
                total: 0,
                page: 1,
                page_size,
                query: String::new(),
                loading: false,
                has_more: true,
                generation: 0,
                next_request_id: 0,
                in_flight: None,
            }),
        }
    }

    /// Fetch one page. Page 1 replaces the list, later pages append.
    ///
    /// The request is tagged with the live generation; if a reset happens
    /// before the response lands, the response is discarded without
    /// touching state.
    pub async fn fetch_page(&self, query: &str, page: u32, limit: u32) {
        let (generation, request_id, cancel) = {
            let mut state = self.state.lock();
            state.loading = true;

            let id = state.next_request_id;
            state.next_request_id += 1;

            let cancel = CancellationToken::new();
            state.in_flight = Some(InFlight {
                id,
                cancel: cancel.clone(),
            });

            (state.generation, id, cancel)
        };

        let result = self.gateway.fetch_page(query, page, limit, cancel).await;

        let mut state = self.state.lock();

        if state.generation != generation {
            debug!(page, "Dropping response from superseded generation");
            return;
        }

        let authoritative = state
            .in_flight
            .as_ref()
            .is_some_and(|flight| flight.id == request_id);

        match result {
            Ok(response) => {
                state.total = response.total;
                state.page = response.page;
                state.page_size = response.page_size;
                // Echoed page/pageSize are the source of truth here.
                state.has_more = response.has_more();

                if page == 1 {
                    state.items = response.items;
                } else {
                    state.items.extend(response.items);
                }

                state.loading = false;
                debug!(
                    page = state.page,
                    loaded = state.items.len(),
                    total = state.total,
                    has_more = state.has_more,
                    "Page applied"
                );
            }
            Err(GatewayError::Cancelled) => {
                // Expected and silent; only the request we still track may
                // clear the loading flag.
                if authoritative {
                    state.loading = false;
                }
            }
            Err(e) => {
                warn!(error = %e, page, "Page fetch failed, degrading to empty");
                state.items.clear();
                state.total = 0;
                state.has_more = false;
                state.loading = false;
            }
        }

        if authoritative {
            state.in_flight = None;
        }
    }

    /// Start over with a new query: cancel the outstanding request, bump
    /// the generation, clear the list, and fetch page 1.
    pub async fn reset_and_fetch(&self, query: &str) {
        let limit = {
            let mut state = self.state.lock();

            if let Some(flight) = state.in_flight.take() {
                flight.cancel.cancel();
            }

            state.generation += 1;
            state.items.clear();
            state.total = 0;
            state.page = 1;
            state.has_more = true;
            state.loading = false;
            state.query = query.to_string();

            state.page_size
        };

        self.fetch_page(query, 1, limit).await;
    }

    /// Infinite-scroll trigger: request the next page when the visible
    /// range ends within [`SCROLL_LOOKAHEAD`] of the loaded list, nothing
    /// is loading, and more items exist. The loading check under the lock
    /// keeps this from double-firing while a fetch is outstanding.
    pub async fn maybe_fetch_next(&self, visible_end: usize) {
        let (query, page, limit) = {
            let state = self.state.lock();

            if state.loading || !state.has_more {
                return;
            }
            if visible_end + SCROLL_LOOKAHEAD < state.items.len() {
                return;
            }

            (state.query.clone(), state.page + 1, state.page_size)
        };

        self.fetch_page(&query, page, limit).await;
    }

    /// Abort the outstanding request, if any. Call on view unmount.
    pub fn cancel_in_flight(&self) {
        let state = self.state.lock();
        if let Some(flight) = &state.in_flight {
            flight.cancel.cancel();
        }
    }

    /// Current state for rendering.
    pub fn snapshot(&self) -> ListSnapshot {
        let state = self.state.lock();
        ListSnapshot {
            items: state.items.clone(),
            total: state.total,
            page: state.page,
            page_size: state.page_size,
            query: state.query.clone(),
            loading: state.loading,
            has_more: state.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use wares_core::query::{filter_and_paginate, ListQuery};

    /// Gateway over an in-memory dataset with per-query artificial latency.
    ///
    /// `honor_cancel = false` models a transport without abort support, so
    /// superseded responses genuinely arrive late and data-laden; the
    /// generation check alone must reject them.
    struct MockGateway {
        items: Vec<Item>,
        delays: Mutex<HashMap<String, Duration>>,
        calls: AtomicUsize,
        cancellations: AtomicUsize,
        fail: AtomicBool,
        honor_cancel: bool,
    }

    impl MockGateway {
        fn new(items: Vec<Item>) -> Self {
            Self {
                items,
                delays: Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
                cancellations: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                honor_cancel: true,
            }
        }

        fn set_delay(&self, query: &str, delay: Duration) {
            self.delays.lock().insert(query.to_string(), delay);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ItemsGateway for MockGateway {
        async fn fetch_page(
            &self,
            query: &str,
            page: u32,
            limit: u32,
            cancel: CancellationToken,
        ) -> Result<wares_core::ItemPage, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let delay = self
                .delays
                .lock()
                .get(query)
                .copied()
                .unwrap_or(Duration::ZERO);

            if self.honor_cancel {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => {
                        self.cancellations.fetch_add(1, Ordering::SeqCst);
                        return Err(GatewayError::Cancelled);
                    }
                }
            } else {
                tokio::time::sleep(delay).await;
            }

            if self.fail.load(Ordering::SeqCst) {
                return Err(GatewayError::Transport("connection refused".into()));
            }

            let list_query = ListQuery {
                q: Some(query.to_string()),
                page: Some(page),
                limit: Some(limit),
            };
            Ok(filter_and_paginate(self.items.clone(), &list_query))
        }
    }

    fn dataset() -> Vec<Item> {
        let mut items: Vec<Item> = (1..=25)
            .map(|i| Item {
                id: i,
                name: format!("apple {i}"),
                category: "fruit".into(),
                price: i as f64,
            })
            .collect();
        items.extend((1..=7).map(|i| Item {
            id: 100 + i,
            name: format!("berry {i}"),
            category: "fruit".into(),
            price: i as f64,
        }));
        items
    }

    #[tokio::test]
    async fn test_page_one_replaces_later_pages_append() {
        let gateway = Arc::new(MockGateway::new(dataset()));
        let controller = ListController::new(Arc::clone(&gateway), 10);

        controller.fetch_page("apple", 1, 10).await;
        let snap = controller.snapshot();
        assert_eq!(snap.items.len(), 10);
        assert_eq!(snap.total, 25);
        assert!(snap.has_more);

        controller.fetch_page("apple", 2, 10).await;
        let snap = controller.snapshot();
        assert_eq!(snap.items.len(), 20);
        assert_eq!(snap.items[0].name, "apple 1");
        assert_eq!(snap.items[10].name, "apple 11");
        assert!(snap.has_more);

        controller.fetch_page("apple", 3, 10).await;
        let snap = controller.snapshot();
        assert_eq!(snap.items.len(), 25);
        assert!(!snap.has_more);
        assert!(!snap.loading);

        // Fetching page 1 again starts the accumulation over.
        controller.fetch_page("apple", 1, 10).await;
        assert_eq!(controller.snapshot().items.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_rejected() {
        let gateway = {
            let mut gw = MockGateway::new(dataset());
            gw.honor_cancel = false; // let the superseded response arrive
            gw.set_delay("apple", Duration::from_millis(100));
            gw.set_delay("berry", Duration::from_millis(10));
            Arc::new(gw)
        };
        let controller = Arc::new(ListController::new(Arc::clone(&gateway), 10));

        let slow = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.fetch_page("apple", 1, 10).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;

        controller.reset_and_fetch("berry").await;

        // The "apple" response lands now, after the reset, and must not
        // touch the list.
        slow.await.unwrap();

        let snap = controller.snapshot();
        assert_eq!(snap.query, "berry");
        assert_eq!(snap.total, 7);
        assert!(snap.items.iter().all(|i| i.name.starts_with("berry")));
        assert!(!snap.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_previous_request() {
        let gateway = {
            let gw = MockGateway::new(dataset());
            gw.set_delay("apple", Duration::from_millis(100));
            Arc::new(gw)
        };
        let controller = Arc::new(ListController::new(Arc::clone(&gateway), 10));

        let slow = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.fetch_page("apple", 1, 10).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;

        controller.reset_and_fetch("berry").await;
        slow.await.unwrap();

        assert_eq!(gateway.cancellations.load(Ordering::SeqCst), 1);
        let snap = controller.snapshot();
        assert_eq!(snap.total, 7);
        assert!(!snap.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancellation_is_silent() {
        let gateway = {
            let gw = MockGateway::new(dataset());
            gw.set_delay("apple", Duration::from_millis(100));
            Arc::new(gw)
        };
        let controller = Arc::new(ListController::new(Arc::clone(&gateway), 10));

        let fetch = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.fetch_page("apple", 1, 10).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;

        controller.cancel_in_flight();
        fetch.await.unwrap();

        let snap = controller.snapshot();
        assert!(snap.items.is_empty());
        assert!(!snap.loading);
        assert!(snap.has_more); // not an error state
        assert_eq!(snap.total, 0);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty() {
        let gateway = Arc::new(MockGateway::new(dataset()));
        let controller = ListController::new(Arc::clone(&gateway), 10);

        controller.fetch_page("apple", 1, 10).await;
        assert_eq!(controller.snapshot().items.len(), 10);

        gateway.fail.store(true, Ordering::SeqCst);
        controller.fetch_page("apple", 2, 10).await;

        let snap = controller.snapshot();
        assert!(snap.items.is_empty());
        assert_eq!(snap.total, 0);
        assert!(!snap.has_more);
        assert!(!snap.loading);
    }

    #[tokio::test]
    async fn test_scroll_trigger_respects_lookahead() {
        let gateway = Arc::new(MockGateway::new(dataset()));
        let controller = ListController::new(Arc::clone(&gateway), 10);

        controller.reset_and_fetch("apple").await;
        assert_eq!(gateway.calls(), 1);

        // 10 items loaded; stop index 4 is more than 5 away from the end.
        controller.maybe_fetch_next(4).await;
        assert_eq!(gateway.calls(), 1);

        // Stop index 5 reaches the lookahead window.
        controller.maybe_fetch_next(5).await;
        assert_eq!(gateway.calls(), 2);
        assert_eq!(controller.snapshot().items.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_trigger_does_not_double_fire() {
        let gateway = {
            let gw = MockGateway::new(dataset());
            gw.set_delay("apple", Duration::from_millis(50));
            Arc::new(gw)
        };
        let controller = Arc::new(ListController::new(Arc::clone(&gateway), 10));

        controller.reset_and_fetch("apple").await;
        assert_eq!(gateway.calls(), 1);

        let scroll = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.maybe_fetch_next(9).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;

        // A second trigger while the page-2 fetch is outstanding is a no-op.
        controller.maybe_fetch_next(9).await;
        scroll.await.unwrap();

        assert_eq!(gateway.calls(), 2);
        assert_eq!(controller.snapshot().items.len(), 20);
    }

    #[tokio::test]
    async fn test_no_trigger_when_exhausted() {
        let gateway = Arc::new(MockGateway::new(dataset()));
        let controller = ListController::new(Arc::clone(&gateway), 10);

        controller.reset_and_fetch("berry").await;
        let snap = controller.snapshot();
        assert_eq!(snap.items.len(), 7);
        assert!(!snap.has_more);

        controller.maybe_fetch_next(6).await;
        assert_eq!(gateway.calls(), 1);
    }
}
