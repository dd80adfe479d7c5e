pub mod client;
pub mod error;
pub mod navigation;
pub mod store;
pub mod types;

pub use client::NewsClient;
pub use error::{Error, Result};
pub use navigation::{NavigationEvent, Navigator, HOME_PATH};
pub use store::ArticleStore;
pub use types::*;

pub mod prelude {
    pub use super::{
        Article, ArticleList, ArticleStore, Category, Country, Error, Navigator, NewsClient, Result,
    };
}
