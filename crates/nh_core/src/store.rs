use crate::types::Article;

/// Write side of the shared article store that the page views render from.
pub trait ArticleStore: Send + Sync {
    /// Articles of the active category, kept apart from search results
    fn set_article_category(&self, articles: Vec<Article>);

    /// The list currently displayed on the home view
    fn set_articles(&self, articles: Vec<Article>);

    /// The article opened in the detail view
    fn set_article(&self, article: Article);

    fn set_search_mode(&self, enabled: bool);

    fn set_category_name(&self, name: &str);
}
