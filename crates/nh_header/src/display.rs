use nh_core::{Article, ArticleStore};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySnapshot {
    pub category_articles: Vec<Article>,
    pub articles: Vec<Article>,
    pub article: Option<Article>,
    pub search_mode: bool,
    pub category_name: Option<String>,
}

/// In-process article store shared by the header and the page views.
#[derive(Debug, Default)]
pub struct DisplayStore {
    state: Mutex<DisplaySnapshot>,
}

impl DisplayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, DisplaySnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ArticleStore for DisplayStore {
    fn set_article_category(&self, articles: Vec<Article>) {
        self.lock().category_articles = articles;
    }

    fn set_articles(&self, articles: Vec<Article>) {
        self.lock().articles = articles;
    }

    fn set_article(&self, article: Article) {
        self.lock().article = Some(article);
    }

    fn set_search_mode(&self, enabled: bool) {
        self.lock().search_mode = enabled;
    }

    fn set_category_name(&self, name: &str) {
        self.lock().category_name = Some(name.to_string());
    }
}
