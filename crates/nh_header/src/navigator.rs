use nh_core::{
    ArticleList, ArticleStore, Category, CategorySelection, Country, NavigationEvent, Navigator,
    NewsClient, DEFAULT_CATEGORY_NAME, HOME_PATH,
};
use nh_storage::PersistentPreferences;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::HeaderConfig;

#[derive(Debug)]
struct Selection {
    category: CategorySelection,
    country: Country,
}

/// Owns the header's category and country selection.
///
/// Category and country fetches are not serialized against each other: when
/// two overlap, whichever resolves last decides what the store shows.
pub struct CategoryNavigator {
    client: Arc<dyn NewsClient>,
    store: Arc<dyn ArticleStore>,
    prefs: Arc<PersistentPreferences>,
    navigator: Arc<dyn Navigator>,
    config: HeaderConfig,
    selection: Mutex<Selection>,
    country_tx: watch::Sender<Country>,
}

impl CategoryNavigator {
    pub fn new(
        client: Arc<dyn NewsClient>,
        store: Arc<dyn ArticleStore>,
        prefs: Arc<PersistentPreferences>,
        navigator: Arc<dyn Navigator>,
        config: HeaderConfig,
    ) -> Self {
        let category = CategorySelection {
            category: prefs.active_category().unwrap_or_default(),
            display_name: prefs
                .category_name()
                .unwrap_or_else(|| DEFAULT_CATEGORY_NAME.to_string()),
        };
        let country = prefs.selected_country().unwrap_or_default();
        let (country_tx, _) = watch::channel(country);

        Self {
            client,
            store,
            prefs,
            navigator,
            config,
            selection: Mutex::new(Selection { category, country }),
            country_tx,
        }
    }

    pub fn active_category(&self) -> Category {
        self.lock().category.category
    }

    pub fn category_selection(&self) -> CategorySelection {
        self.lock().category.clone()
    }

    pub fn selected_country(&self) -> Country {
        self.lock().country
    }

    /// Follows every country the user picks.
    pub fn subscribe_country(&self) -> watch::Receiver<Country> {
        self.country_tx.subscribe()
    }

    /// Loads the last category into the home view when the app opens on it.
    pub async fn start(&self) {
        let path = self.navigator.current_path();
        if !self.config.is_home(&path) {
            debug!("Starting on {}, skipping initial fetch", path);
            return;
        }
        let category = self.active_category();
        self.select_category(category, DEFAULT_CATEGORY_NAME).await;
    }

    pub async fn select_category(&self, category: Category, display_name: &str) {
        let country = self.selected_country();
        match self
            .client
            .get_news_by_category_and_country(category.code(), country.code())
            .await
        {
            Ok(list) => self.apply(category, display_name, list),
            Err(e) => error!("Fetch news by category {}/{} failed: {}", category, country, e),
        }
    }

    /// Re-fetches the active category for the new country.
    pub async fn select_country(&self, country: Country) {
        let selection = {
            let mut state = self.lock();
            state.country = country;
            state.category.clone()
        };
        self.prefs.set_selected_country(country);
        self.country_tx.send_replace(country);
        info!("🌍 Country set to {} ({})", country.code(), country.name());

        self.select_category(selection.category, &selection.display_name).await;
    }

    /// History moves can land on a view without going through `select_category`,
    /// so the active category is taken back from storage.
    pub fn on_navigation_completed(&self, event: &NavigationEvent) {
        let category = self.prefs.active_category().unwrap_or_default();
        let name = self.prefs.category_name();
        let mut state = self.lock();
        if state.category.category != category {
            debug!("Navigation to {} restored category {}", event.path(), category);
        }
        state.category.category = category;
        if let Some(name) = name {
            state.category.display_name = name;
        }
    }

    pub fn spawn_navigation_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.navigator.subscribe();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => this.on_navigation_completed(&event),
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Navigation listener missed {} events", missed);
                        let path = this.navigator.current_path();
                        let event = NavigationEvent::NavigationCompleted { path };
                        this.on_navigation_completed(&event);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn apply(&self, category: Category, display_name: &str, list: ArticleList) {
        {
            let mut state = self.lock();
            state.category = CategorySelection {
                category,
                display_name: display_name.to_string(),
            };
        }
        self.prefs.set_active_category(category);
        self.store.set_category_name(display_name);
        self.prefs.set_category_name(display_name);
        info!("📰 Showing {} articles for {}", list.articles.len(), category);
        self.store.set_article_category(list.articles.clone());
        self.store.set_articles(list.articles);

        let path = self.navigator.current_path();
        if !self.config.is_home(&path) {
            self.navigator.navigate_to(HOME_PATH);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
