use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::SearchCoordinator;

const SIGNAL_CAPACITY: usize = 16;

/// State of the bus after a transition. `raise` counts every `request_reset`
/// so a consumer can tell a new raise from one it has already handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetSignal {
    pub requested: bool,
    pub raise: u64,
}

#[derive(Debug)]
struct BusInner {
    state: Mutex<ResetSignal>,
    tx: broadcast::Sender<ResetSignal>,
}

/// Shared "reset requested" flag.
///
/// The flag stays raised until some consumer acknowledges it. Every
/// transition is also broadcast, so each subscriber sees a raise even
/// if another subscriber acknowledges it first.
#[derive(Debug, Clone)]
pub struct ResetBus {
    inner: Arc<BusInner>,
}

impl ResetBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            inner: Arc::new(BusInner {
                state: Mutex::new(ResetSignal::default()),
                tx,
            }),
        }
    }

    pub fn request_reset(&self) {
        let mut state = self.lock();
        state.requested = true;
        state.raise = state.raise.wrapping_add(1);
        // Sent under the lock so subscribers see transitions in order
        let _ = self.inner.tx.send(*state);
    }

    pub fn acknowledge_reset(&self) {
        let mut state = self.lock();
        if state.requested {
            state.requested = false;
            let _ = self.inner.tx.send(*state);
        }
    }

    pub fn is_reset_requested(&self) -> bool {
        self.lock().requested
    }

    pub fn current(&self) -> ResetSignal {
        *self.lock()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResetSignal> {
        self.inner.tx.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, ResetSignal> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ResetBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the header's search state whenever the bus is raised, then lowers it.
/// Each raise is handled at most once.
#[derive(Clone)]
pub struct ResetBroadcastListener {
    bus: ResetBus,
    search: SearchCoordinator,
    handled: Arc<AtomicU64>,
}

impl ResetBroadcastListener {
    pub fn new(bus: ResetBus, search: SearchCoordinator) -> Self {
        Self {
            bus,
            search,
            handled: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn on_signal(&self, signal: ResetSignal) {
        if !signal.requested {
            return;
        }
        let previous = self.handled.fetch_max(signal.raise, Ordering::AcqRel);
        if signal.raise <= previous {
            debug!("Reset #{} already handled", signal.raise);
            return;
        }
        debug!("Reset #{} requested, clearing search", signal.raise);
        self.search.reset_search_data();
        self.bus.acknowledge_reset();
    }

    pub fn spawn(self) -> JoinHandle<()> {
        let mut signals = self.bus.subscribe();
        tokio::spawn(async move {
            // Raised before the first poll; the queued copy is skipped below
            self.on_signal(self.bus.current());
            loop {
                match signals.recv().await {
                    Ok(signal) => self.on_signal(signal),
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Reset listener missed {} signals", missed);
                        self.on_signal(self.bus.current());
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNewsClient;
    use crate::DisplayStore;
    use std::time::Duration;
    use tokio::time::sleep;

    fn search() -> (SearchCoordinator, Arc<FakeNewsClient>) {
        let client = Arc::new(FakeNewsClient::new());
        let store = Arc::new(DisplayStore::new());
        let search = SearchCoordinator::new(client.clone(), store, Duration::from_millis(500));
        (search, client)
    }

    #[test]
    fn test_acknowledge_lowers_flag() {
        let bus = ResetBus::new();
        let mut signals = bus.subscribe();

        bus.request_reset();
        assert!(bus.is_reset_requested());
        bus.acknowledge_reset();
        bus.acknowledge_reset();

        assert!(!bus.is_reset_requested());
        assert_eq!(signals.try_recv().unwrap(), ResetSignal { requested: true, raise: 1 });
        assert_eq!(signals.try_recv().unwrap(), ResetSignal { requested: false, raise: 1 });
        assert!(signals.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_results_and_acknowledges() {
        let (search, client) = search();
        search.on_term_changed("flood");
        sleep(Duration::from_secs(1)).await;
        assert_eq!(search.results().len(), 1);

        let bus = ResetBus::new();
        let handle = ResetBroadcastListener::new(bus.clone(), search.clone()).spawn();

        bus.request_reset();
        sleep(Duration::from_millis(1)).await;

        assert!(search.results().is_empty());
        assert!(!bus.is_reset_requested());
        assert_eq!(client.reset_count(), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_false_signal_is_ignored() {
        let (search, client) = search();
        let listener = ResetBroadcastListener::new(ResetBus::new(), search.clone());

        listener.on_signal(ResetSignal { requested: false, raise: 3 });
        assert_eq!(client.reset_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_redelivered_raise_is_ignored() {
        let (search, client) = search();
        let listener = ResetBroadcastListener::new(ResetBus::new(), search);
        let signal = ResetSignal { requested: true, raise: 1 };

        listener.on_signal(signal);
        listener.on_signal(signal);
        assert_eq!(client.reset_count(), 1);

        listener.on_signal(ResetSignal { requested: true, raise: 2 });
        assert_eq!(client.reset_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_new_raise_is_handled_once() {
        let (search, client) = search();
        let bus = ResetBus::new();
        let handle = ResetBroadcastListener::new(bus.clone(), search).spawn();

        bus.request_reset();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(client.reset_count(), 1);

        bus.request_reset();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(client.reset_count(), 2);
        assert!(!bus.is_reset_requested());
        assert_eq!(bus.current().raise, 2);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_flag_raised_before_spawn_is_handled() {
        let (search, client) = search();
        let bus = ResetBus::new();
        bus.request_reset();

        let handle = ResetBroadcastListener::new(bus.clone(), search).spawn();
        sleep(Duration::from_millis(1)).await;

        assert!(!bus.is_reset_requested());
        assert_eq!(client.reset_count(), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_subscriber_sees_the_raise() {
        let (search, _client) = search();
        let bus = ResetBus::new();
        let mut other = bus.subscribe();
        let handle = ResetBroadcastListener::new(bus.clone(), search).spawn();

        bus.request_reset();
        sleep(Duration::from_millis(1)).await;

        assert!(other.recv().await.unwrap().requested);
        assert!(!other.recv().await.unwrap().requested);
        handle.abort();
    }
}
