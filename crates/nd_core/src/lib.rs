pub mod api;
pub mod error;
pub mod filters;
pub mod types;

pub use api::NewsApi;
pub use error::{Error, Result};
pub use filters::{ArticleQuery, FilterForm, FilterState, PageState, DEFAULT_PAGE_SIZE};
pub use types::{
    Article, ArticlePage, FetchOutcome, ProcessOutcome, ProcessRequest, Sentiment, SentimentStats, Stats,
    TaskStatus,
};

pub mod prelude {
    pub use crate::{Article, ArticlePage, ArticleQuery, Error, FilterState, NewsApi, Result};
}
