use async_trait::async_trait;
use crate::types::ArticleList;
use crate::Result;

#[async_trait]
pub trait NewsClient: Send + Sync {
    /// Full-text search across all sources
    async fn search(&self, term: &str) -> Result<ArticleList>;

    /// Top headlines for a category within a country
    async fn get_news_by_category_and_country(
        &self,
        category: &str,
        country: &str,
    ) -> Result<ArticleList>;

    /// Best-effort notification that the current search has been abandoned
    fn reset_search(&self) {}
}
