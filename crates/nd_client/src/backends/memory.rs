use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use nd_core::{
    Article, ArticlePage, ArticleQuery, Error, FetchOutcome, NewsApi, ProcessOutcome, ProcessRequest, Result,
    SentimentStats, Stats, TaskStatus,
};
use serde_json::json;
use tokio::sync::{RwLock, RwLockWriteGuard};

/// Most recent list queries kept by [`MemoryNewsApi::requests`].
pub const REQUEST_LOG_LIMIT: usize = 64;

/// Backend calls, for scripting failures and counting requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Stats,
    Sources,
    Sentiments,
    Articles,
    ArticleById,
    Process,
    Fetch,
    TaskStatus,
}

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    incoming: Vec<Article>,
    scripted_batches: VecDeque<u64>,
    failures: HashMap<Operation, String>,
    calls: HashMap<Operation, usize>,
    latency: HashMap<Operation, Duration>,
    tasks: HashMap<String, TaskStatus>,
    requests: VecDeque<ArticleQuery>,
}

impl MemoryStore {
    fn record(&mut self, op: Operation) -> Result<()> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.get(&op) {
            Some(message) => Err(Error::Task(message.clone())),
            None => Ok(()),
        }
    }

    fn log_request(&mut self, query: &ArticleQuery) {
        if self.requests.len() == REQUEST_LOG_LIMIT {
            self.requests.pop_front();
        }
        self.requests.push_back(query.clone());
    }

    fn stats(&self) -> Stats {
        let mut sentiment_stats = SentimentStats::default();
        let mut source_stats = std::collections::BTreeMap::new();
        for article in &self.articles {
            match article.sentiment.as_deref() {
                Some("positive") => sentiment_stats.positive += 1,
                Some("negative") => sentiment_stats.negative += 1,
                Some("neutral") => sentiment_stats.neutral += 1,
                _ => {}
            }
            if let Some(source) = &article.source {
                *source_stats.entry(source.clone()).or_insert(0) += 1;
            }
        }
        let processed = self.articles.iter().filter(|a| a.ai_processed).count() as u64;
        Stats {
            total_articles: self.articles.len() as u64,
            processed_articles: processed,
            unprocessed_articles: self.articles.len() as u64 - processed,
            sentiment_stats,
            source_stats,
        }
    }

    fn distinct<F>(&self, field: F) -> Vec<String>
    where
        F: Fn(&Article) -> Option<&String>,
    {
        let mut seen = HashSet::new();
        self.articles
            .iter()
            .filter_map(|a| field(a))
            .filter(|v| !v.is_empty() && seen.insert((*v).clone()))
            .cloned()
            .collect()
    }

    fn query(&self, query: &ArticleQuery) -> Result<ArticlePage> {
        let filters = &query.filters;
        let set = |v: &Option<String>| v.as_deref().filter(|v| !v.is_empty()).map(str::to_string);
        let source = set(&filters.source);
        let sentiment = set(&filters.sentiment);
        let ai_processed = match set(&filters.ai_processed).as_deref() {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => return Err(Error::Decode(format!("invalid ai_processed value: {}", other))),
        };
        let range = match (set(&filters.start_date), set(&filters.end_date)) {
            (Some(start), Some(end)) => Some((parse_day(&start)?, parse_day(&end)?)),
            _ => None,
        };

        let mut matching: Vec<&Article> = self
            .articles
            .iter()
            .filter(|a| source.is_none() || a.source == source)
            .filter(|a| sentiment.is_none() || a.sentiment == sentiment)
            .filter(|a| ai_processed.map_or(true, |flag| a.ai_processed == flag))
            .filter(|a| match range {
                Some((start, end)) => published_day(a).map_or(false, |day| start <= day && day <= end),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| b.published.cmp(&a.published));

        let page = query.page.max(1);
        let offset = (page as usize - 1) * query.page_size as usize;
        Ok(ArticlePage {
            total: matching.len() as u64,
            articles: matching
                .into_iter()
                .skip(offset)
                .take(query.page_size as usize)
                .cloned()
                .collect(),
            page: Some(page),
            page_size: Some(query.page_size),
        })
    }

    fn process(&mut self, request: &ProcessRequest) -> ProcessOutcome {
        let mut processed = 0u64;
        for article in self.articles.iter_mut().filter(|a| !a.ai_processed).take(request.batch_size as usize) {
            article.ai_processed = true;
            article.sentiment.get_or_insert_with(|| "neutral".to_string());
            article.sentiment_score.get_or_insert(0.0);
            article.updated_at = Some(Utc::now().to_rfc3339());
            processed += 1;
        }
        if let Some(scripted) = self.scripted_batches.pop_front() {
            processed = scripted;
        }
        let task_id = self.finish_task("process");
        ProcessOutcome {
            processed,
            task_id: Some(task_id),
            message: None,
        }
    }

    fn fetch(&mut self) -> FetchOutcome {
        let incoming = std::mem::take(&mut self.incoming);
        for article in incoming {
            if !self.articles.iter().any(|a| a.id == article.id) {
                self.articles.push(article);
            }
        }
        let stats = self.stats();
        FetchOutcome {
            total_articles: stats.total_articles,
            unprocessed_articles: stats.unprocessed_articles,
            task_id: Some(self.finish_task("fetch")),
        }
    }

    fn finish_task(&mut self, kind: &str) -> String {
        let task_id = format!("memory-{}", self.tasks.len() + 1);
        let now = Utc::now().to_rfc3339();
        self.tasks.insert(
            task_id.clone(),
            TaskStatus {
                kind: kind.to_string(),
                status: "completed".to_string(),
                started_at: Some(now.clone()),
                finished_at: Some(now),
                detail: Some(json!({})),
            },
        );
        task_id
    }
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| Error::Status {
        status: 400,
        reason: "日期格式错误，请使用YYYY-MM-DD格式".to_string(),
    })
}

fn published_day(article: &Article) -> Option<NaiveDate> {
    let published = article.published.as_deref()?;
    NaiveDate::parse_from_str(published.get(..10)?, "%Y-%m-%d").ok()
}

/// In-process backend holding articles in memory.
///
/// Besides serving the dashboard without a server, it can be scripted to
/// report specific batch counts or to fail specific calls.
#[derive(Clone, Default)]
pub struct MemoryNewsApi {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryNewsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        let store = MemoryStore {
            articles,
            ..Default::default()
        };
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Articles that appear on the next `fetch_latest`.
    pub async fn queue_incoming(&self, articles: Vec<Article>) {
        self.store.write().await.incoming.extend(articles);
    }

    /// Override the processed count reported by the next batches, in order.
    pub async fn script_batches(&self, counts: impl IntoIterator<Item = u64>) {
        self.store.write().await.scripted_batches.extend(counts);
    }

    pub async fn fail(&self, op: Operation, message: &str) {
        self.store.write().await.failures.insert(op, message.to_string());
    }

    pub async fn recover(&self, op: Operation) {
        self.store.write().await.failures.remove(&op);
    }

    /// Delay every `op` call by `delay` before it touches the store.
    pub async fn set_latency(&self, op: Operation, delay: Duration) {
        self.store.write().await.latency.insert(op, delay);
    }

    pub async fn calls(&self, op: Operation) -> usize {
        self.store.read().await.calls.get(&op).copied().unwrap_or(0)
    }

    /// The latest list queries received, oldest first.
    pub async fn requests(&self) -> Vec<ArticleQuery> {
        self.store.read().await.requests.iter().cloned().collect()
    }

    async fn enter(&self, op: Operation) -> Result<RwLockWriteGuard<'_, MemoryStore>> {
        let delay = self.store.read().await.latency.get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut store = self.store.write().await;
        store.record(op)?;
        Ok(store)
    }
}

#[async_trait]
impl NewsApi for MemoryNewsApi {
    fn name(&self) -> &str {
        "memory"
    }

    async fn stats(&self) -> Result<Stats> {
        let store = self.enter(Operation::Stats).await?;
        Ok(store.stats())
    }

    async fn sources(&self) -> Result<Vec<String>> {
        let store = self.enter(Operation::Sources).await?;
        Ok(store.distinct(|a| a.source.as_ref()))
    }

    async fn sentiments(&self) -> Result<Vec<String>> {
        let store = self.enter(Operation::Sentiments).await?;
        Ok(store.distinct(|a| a.sentiment.as_ref()))
    }

    async fn articles(&self, query: &ArticleQuery) -> Result<ArticlePage> {
        let mut store = self.enter(Operation::Articles).await?;
        store.log_request(query);
        store.query(query)
    }

    async fn article_by_id(&self, id: &str) -> Result<Article> {
        let store = self.enter(Operation::ArticleById).await?;
        store
            .articles
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Error::Status {
                status: 404,
                reason: "Not Found".to_string(),
            })
    }

    async fn process_unprocessed(&self, request: &ProcessRequest) -> Result<ProcessOutcome> {
        let mut store = self.enter(Operation::Process).await?;
        Ok(store.process(request))
    }

    async fn fetch_latest(&self) -> Result<FetchOutcome> {
        let mut store = self.enter(Operation::Fetch).await?;
        Ok(store.fetch())
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        let store = self.enter(Operation::TaskStatus).await?;
        store
            .tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("task {}", task_id)))
    }
}
