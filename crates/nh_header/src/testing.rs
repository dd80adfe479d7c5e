//! Scriptable collaborators for exercising the header without a network.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nh_core::{Article, ArticleList, Error, NewsClient, Result, Source};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    Category { category: String, country: String },
}

#[derive(Debug, Clone)]
struct Scripted {
    delay: Duration,
    result: std::result::Result<Vec<Article>, String>,
}

/// Records every request. Unscripted requests answer immediately with a single
/// article titled after the request key (`term` or `category/country`).
#[derive(Debug, Default)]
pub struct FakeNewsClient {
    calls: Mutex<Vec<Call>>,
    scripts: Mutex<HashMap<String, Scripted>>,
    resets: AtomicUsize,
}

impl FakeNewsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, key: &str, articles: Vec<Article>) -> &Self {
        self.script(key, Duration::ZERO, Ok(articles))
    }

    pub fn respond_after(&self, key: &str, delay: Duration, articles: Vec<Article>) -> &Self {
        self.script(key, delay, Ok(articles))
    }

    pub fn fail(&self, key: &str, message: &str) -> &Self {
        self.script(key, Duration::ZERO, Err(message.to_string()))
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(term) => Some(term),
                Call::Category { .. } => None,
            })
            .collect()
    }

    pub fn category_calls(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Category { category, country } => Some((category, country)),
                Call::Search(_) => None,
            })
            .collect()
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    fn script(
        &self,
        key: &str,
        delay: Duration,
        result: std::result::Result<Vec<Article>, String>,
    ) -> &Self {
        lock(&self.scripts).insert(key.to_string(), Scripted { delay, result });
        self
    }

    async fn answer(&self, call: Call, key: String) -> Result<ArticleList> {
        lock(&self.calls).push(call);
        let scripted = lock(&self.scripts).get(&key).cloned();
        let Some(scripted) = scripted else {
            return Ok(ArticleList::new(vec![article(&key)]));
        };
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.result.map(ArticleList::new).map_err(Error::Fetch)
    }
}

#[async_trait]
impl NewsClient for FakeNewsClient {
    async fn search(&self, term: &str) -> Result<ArticleList> {
        self.answer(Call::Search(term.to_string()), term.to_string()).await
    }

    async fn get_news_by_category_and_country(
        &self,
        category: &str,
        country: &str,
    ) -> Result<ArticleList> {
        let call = Call::Category {
            category: category.to_string(),
            country: country.to_string(),
        };
        self.answer(call, format!("{}/{}", category, country)).await
    }

    fn reset_search(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn article(title: &str) -> Article {
    Article {
        source: Source {
            id: None,
            name: "Fake Wire".to_string(),
        },
        author: None,
        title: title.to_string(),
        description: Some(format!("About {}", title)),
        url: format!("https://news.example/{}", urlencoding::encode(title)),
        url_to_image: None,
        published_at: Utc.timestamp_opt(1_704_067_200, 0).single().unwrap_or_default(),
        content: None,
    }
}

pub fn titles(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.title.as_str()).collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
