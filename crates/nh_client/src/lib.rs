pub mod http;

pub use http::{HttpNewsClient, DEFAULT_BASE_URL};

pub mod prelude {
    pub use super::HttpNewsClient;
    pub use nh_core::{ArticleList, NewsClient, Result, Error};
}
