use nh_core::{Article, ArticleList, ArticleStore, Error, NewsClient, Result, SearchQuery};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Default)]
struct SearchState {
    /// Bumped on every keystroke and reset. A debounce timer only fires if it
    /// still holds the latest value.
    keystroke: u64,
    pending: Option<JoinHandle<()>>,
    last_dispatched: Option<SearchQuery>,
    /// Sequence number of the most recent dispatch. Completions carrying any
    /// other number are stale.
    dispatched: u64,
    in_flight: Option<CancellationToken>,
    results: Vec<Article>,
}

impl SearchState {
    fn disarm(&mut self) {
        self.keystroke = self.keystroke.wrapping_add(1);
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    fn supersede(&mut self) -> u64 {
        self.dispatched = self.dispatched.wrapping_add(1);
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.dispatched
    }
}

struct Inner {
    client: Arc<dyn NewsClient>,
    store: Arc<dyn ArticleStore>,
    debounce: Duration,
    state: Mutex<SearchState>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn dispatch(self: Arc<Self>, keystroke: u64, query: SearchQuery) {
        let (seq, token) = {
            let mut state = self.lock();
            if state.keystroke != keystroke {
                debug!("Query {:?} superseded before dispatch", query.as_str());
                return;
            }
            state.pending = None;
            if state.last_dispatched.as_ref() == Some(&query) {
                debug!("Query {:?} unchanged, not searching again", query.as_str());
                return;
            }
            state.last_dispatched = Some(query.clone());
            let seq = state.supersede();
            let token = CancellationToken::new();
            state.in_flight = Some(token.clone());
            (seq, token)
        };

        debug!("Dispatching search #{} for {:?}", seq, query.as_str());
        let result = tokio::select! {
            _ = token.cancelled() => Err(Error::StaleResult),
            result = self.client.search(query.as_str()) => result,
        };
        self.complete(seq, &query, result);
    }

    fn complete(&self, seq: u64, query: &SearchQuery, result: Result<ArticleList>) {
        let mut state = self.lock();
        if seq != state.dispatched {
            debug!(
                "Discarding stale results for {:?} (#{} < #{})",
                query.as_str(),
                seq,
                state.dispatched
            );
            return;
        }
        state.in_flight = None;

        match result {
            Ok(list) => {
                info!("🔍 {} results for {:?}", list.articles.len(), query.as_str());
                self.store.set_articles(list.articles.clone());
                self.store.set_search_mode(true);
                state.results = list.articles;
            }
            Err(Error::StaleResult) => debug!("Search for {:?} cancelled", query.as_str()),
            Err(e) => {
                error!("Search for {:?} failed: {}", query.as_str(), e);
                // Let the same term be retried
                state.last_dispatched = None;
            }
        }
    }
}

/// Debounced, latest-wins search behind the header's search box.
///
/// Cheap to clone; clones share the same pipeline. Must be driven from inside a
/// Tokio runtime, since each keystroke arms a timer task.
#[derive(Clone)]
pub struct SearchCoordinator {
    inner: Arc<Inner>,
}

impl SearchCoordinator {
    pub fn new(
        client: Arc<dyn NewsClient>,
        store: Arc<dyn ArticleStore>,
        debounce: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                store,
                debounce,
                state: Mutex::new(SearchState::default()),
            }),
        }
    }

    pub fn on_term_changed(&self, raw_input: &str) {
        match SearchQuery::parse(raw_input) {
            Some(query) => self.enqueue(query),
            None => self.reset_search_data(),
        }
    }

    /// Clears the local results and abandons any pending or in-flight search.
    /// The store's search mode is left as it is.
    pub fn reset_search_data(&self) {
        {
            let mut state = self.inner.lock();
            state.disarm();
            state.supersede();
            state.last_dispatched = None;
            state.results.clear();
        }
        self.inner.client.reset_search();
        debug!("Search data reset");
    }

    pub fn results(&self) -> Vec<Article> {
        self.inner.lock().results.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.lock().in_flight.is_some()
    }

    fn enqueue(&self, query: SearchQuery) {
        let mut state = self.inner.lock();
        state.disarm();
        let keystroke = state.keystroke;
        let inner = Arc::clone(&self.inner);
        state.pending = Some(tokio::spawn(async move {
            sleep(inner.debounce).await;
            inner.dispatch(keystroke, query).await;
        }));
    }
}
