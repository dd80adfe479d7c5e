use nh_core::{Article, ArticleStore, Category, Country, Navigator, NewsClient};
use nh_storage::PersistentPreferences;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{CategoryNavigator, HeaderConfig, ResetBroadcastListener, ResetBus, SearchCoordinator};

/// The header's components wired to one set of collaborators.
pub struct Header {
    search: SearchCoordinator,
    categories: Arc<CategoryNavigator>,
    reset: ResetBus,
    store: Arc<dyn ArticleStore>,
    navigator: Arc<dyn Navigator>,
}

/// Background listeners started by [`Header::start`]. Dropping the handle stops them.
pub struct HeaderHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl HeaderHandle {
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for HeaderHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl Header {
    pub fn new(
        client: Arc<dyn NewsClient>,
        store: Arc<dyn ArticleStore>,
        navigator: Arc<dyn Navigator>,
        prefs: Arc<PersistentPreferences>,
        reset: ResetBus,
        config: HeaderConfig,
    ) -> Self {
        let search =
            SearchCoordinator::new(Arc::clone(&client), Arc::clone(&store), config.debounce);
        let categories = Arc::new(CategoryNavigator::new(
            client,
            Arc::clone(&store),
            prefs,
            Arc::clone(&navigator),
            config,
        ));

        Self {
            search,
            categories,
            reset,
            store,
            navigator,
        }
    }

    /// Subscribes the listeners, then runs the initial category fetch.
    pub async fn start(&self) -> HeaderHandle {
        let tasks = vec![
            ResetBroadcastListener::new(self.reset.clone(), self.search.clone()).spawn(),
            self.categories.spawn_navigation_listener(),
        ];
        self.categories.start().await;
        info!(
            "Header ready on {} ({} / {})",
            self.navigator.current_path(),
            self.categories.active_category(),
            self.categories.selected_country()
        );
        HeaderHandle { tasks }
    }

    pub fn search(&self) -> &SearchCoordinator {
        &self.search
    }

    pub fn categories(&self) -> &Arc<CategoryNavigator> {
        &self.categories
    }

    pub fn reset_bus(&self) -> &ResetBus {
        &self.reset
    }

    pub fn on_term_changed(&self, raw_input: &str) {
        self.search.on_term_changed(raw_input);
    }

    pub async fn select_category(&self, category: Category, display_name: &str) {
        self.categories.select_category(category, display_name).await;
    }

    pub async fn select_country(&self, country: Country) {
        self.categories.select_country(country).await;
    }

    /// Opens a search hit in the detail view and closes the result list.
    pub fn view_article(&self, article: &Article) {
        self.store.set_article(article.clone());
        self.navigator
            .navigate_to(&format!("/news/{}", urlencoding::encode(&article.title)));
        self.search.reset_search_data();
    }
}
