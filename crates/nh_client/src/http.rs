use async_trait::async_trait;
use nh_core::{ArticleList, Error, NewsClient, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// NewsAPI-compatible retrieval client.
#[derive(Debug)]
pub struct HttpNewsClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    last_search: Mutex<Option<String>>,
}

impl HttpNewsClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("Base URL cannot carry paths: {}", base_url)));
        }

        let client = Client::builder()
            .user_agent(concat!("nh/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            last_search: Mutex::new(None),
        })
    }

    /// Term of the search still considered current, if any.
    pub fn last_search(&self) -> Option<String> {
        self.last_search.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url.query_pairs_mut().extend_pairs(query);
        url
    }

    async fn fetch(&self, url: Url) -> Result<ArticleList> {
        debug!("GET {}", url.path());
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .ok()
                .and_then(|e| e.message.or(e.code))
                .unwrap_or(body);
            return Err(Error::Status { status: status.as_u16(), message });
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        if value.get("status").and_then(|s| s.as_str()) == Some("error") {
            let error: ApiError = serde_json::from_value(value)?;
            return Err(Error::Fetch(
                error.message.or(error.code).unwrap_or_else(|| "unknown API error".to_string()),
            ));
        }

        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl NewsClient for HttpNewsClient {
    async fn search(&self, term: &str) -> Result<ArticleList> {
        *self.last_search.lock().unwrap_or_else(PoisonError::into_inner) = Some(term.to_string());
        let list = self.fetch(self.endpoint("everything", &[("q", term)])).await?;
        info!("🔍 Search for {:?} returned {} articles", term, list.articles.len());
        Ok(list)
    }

    async fn get_news_by_category_and_country(
        &self,
        category: &str,
        country: &str,
    ) -> Result<ArticleList> {
        let url = self.endpoint("top-headlines", &[("category", category), ("country", country)]);
        let list = self.fetch(url).await?;
        info!("📰 {}/{} returned {} articles", category, country, list.articles.len());
        Ok(list)
    }

    fn reset_search(&self) {
        if let Some(term) = self.last_search.lock().unwrap_or_else(PoisonError::into_inner).take() {
            debug!("Search for {:?} reset", term);
        }
    }
}
