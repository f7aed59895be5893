use async_trait::async_trait;

use crate::filters::ArticleQuery;
use crate::types::{Article, ArticlePage, FetchOutcome, ProcessOutcome, ProcessRequest, Stats, TaskStatus};
use crate::Result;

/// The dashboard's view of the news backend.
#[async_trait]
pub trait NewsApi: Send + Sync {
    fn name(&self) -> &str;

    /// `GET /api/stats`
    async fn stats(&self) -> Result<Stats>;

    /// `GET /api/sources`
    async fn sources(&self) -> Result<Vec<String>>;

    /// `GET /api/sentiments`
    async fn sentiments(&self) -> Result<Vec<String>>;

    /// `GET /api/articles`
    async fn articles(&self, query: &ArticleQuery) -> Result<ArticlePage>;

    /// `GET /api/articles/by-id`. Missing articles are an error.
    async fn article_by_id(&self, id: &str) -> Result<Article>;

    /// `POST /api/process-unprocessed`, one batch.
    async fn process_unprocessed(&self, request: &ProcessRequest) -> Result<ProcessOutcome>;

    /// `POST /api/fetch-latest`
    async fn fetch_latest(&self) -> Result<FetchOutcome>;

    /// `GET /api/task-status`
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus>;
}
