pub mod config;
pub mod display;
pub mod header;
pub mod navigator;
pub mod reset;
pub mod router;
pub mod search;
pub mod testing;

pub use config::{HeaderConfig, DEFAULT_DEBOUNCE};
pub use display::{DisplaySnapshot, DisplayStore};
pub use header::{Header, HeaderHandle};
pub use navigator::CategoryNavigator;
pub use reset::{ResetBroadcastListener, ResetBus, ResetSignal};
pub use router::HistoryRouter;
pub use search::SearchCoordinator;

pub mod prelude {
    pub use super::{CategoryNavigator, Header, HeaderConfig, ResetBus, SearchCoordinator};
    pub use nh_core::{Article, ArticleList, Category, Country, Error, Result};
}
