use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nd_core::{
    Article, ArticlePage, ArticleQuery, Error, FetchOutcome, NewsApi, ProcessOutcome, ProcessRequest, Result,
    Stats, TaskStatus,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::ClientConfig;

pub struct HttpNewsApi {
    client: Client,
    base: Url,
}

impl fmt::Debug for HttpNewsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpNewsApi").field("base", &self.base.as_str()).finish()
    }
}

impl HttpNewsApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut base = Url::parse(&config.base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl(config.base_url.clone()));
        }
        // Keep any path prefix when joining relative endpoints.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    pub(crate) fn articles_url(&self, query: &ArticleQuery) -> Result<Url> {
        let mut url = self.endpoint("api/articles")?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, url: Url, body: Option<&ProcessRequest>) -> Result<T> {
        debug!("POST {}", url);
        let request = self.client.post(url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        decode(request.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))
}

#[async_trait]
impl NewsApi for HttpNewsApi {
    fn name(&self) -> &str {
        "http"
    }

    async fn stats(&self) -> Result<Stats> {
        self.get_json(self.endpoint("api/stats")?).await
    }

    async fn sources(&self) -> Result<Vec<String>> {
        self.get_json(self.endpoint("api/sources")?).await
    }

    async fn sentiments(&self) -> Result<Vec<String>> {
        self.get_json(self.endpoint("api/sentiments")?).await
    }

    async fn articles(&self, query: &ArticleQuery) -> Result<ArticlePage> {
        self.get_json(self.articles_url(query)?).await
    }

    async fn article_by_id(&self, id: &str) -> Result<Article> {
        let mut url = self.endpoint("api/articles/by-id")?;
        url.query_pairs_mut().append_pair("article_id", id);
        self.get_json(url).await
    }

    async fn process_unprocessed(&self, request: &ProcessRequest) -> Result<ProcessOutcome> {
        self.post_json(self.endpoint("api/process-unprocessed")?, Some(request)).await
    }

    async fn fetch_latest(&self) -> Result<FetchOutcome> {
        self.post_json(self.endpoint("api/fetch-latest")?, None).await
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        let mut url = self.endpoint("api/task-status")?;
        url.query_pairs_mut().append_pair("task_id", task_id);
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use nd_core::FilterState;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route(
                "/api/stats",
                get(|| async {
                    Json(json!({
                        "total_articles": 40,
                        "unprocessed_articles": 25,
                        "sentiment_stats": {"positive": 5, "negative": 3, "neutral": 7}
                    }))
                }),
            )
            .route("/api/sources", get(|| async { Json(json!(["CoinDesk", "Cointelegraph"])) }))
            .route(
                "/api/articles",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({"total": 23, "articles": [], "echo": params}))
                }),
            )
            .route(
                "/api/articles/by-id",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    match params.get("article_id").map(String::as_str) {
                        Some("a1") => Ok(Json(json!({"id": "a1", "title": "Hello"}))),
                        _ => Err(StatusCode::NOT_FOUND),
                    }
                }),
            )
            .route(
                "/api/process-unprocessed",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"processed": body["batch_size"]}))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn api(base_url: &str) -> HttpNewsApi {
        HttpNewsApi::new(&ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_articles_url_encodes_set_filters_only() {
        let api = api("http://localhost:8000/dash");
        let query = ArticleQuery {
            page: 3,
            page_size: 10,
            filters: FilterState {
                source: Some("Coin Desk&Co".to_string()),
                sentiment: Some(String::new()),
                ..Default::default()
            },
        };
        let url = api.articles_url(&query).unwrap();
        assert_eq!(url.path(), "/dash/api/articles");
        assert_eq!(url.query(), Some("page=3&page_size=10&source=Coin+Desk%26Co"));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = HttpNewsApi::new(&ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_round_trip_against_backend() {
        let base = spawn_backend().await;
        let api = api(&base);

        let stats = api.stats().await.unwrap();
        assert_eq!(stats.unprocessed_articles, 25);
        assert_eq!(stats.sentiment_stats.neutral, 7);

        let sources = api.sources().await.unwrap();
        assert_eq!(sources, vec!["CoinDesk", "Cointelegraph"]);

        let page = api
            .articles(&ArticleQuery {
                page: 1,
                page_size: 10,
                filters: FilterState::default(),
            })
            .await
            .unwrap();
        assert_eq!(page.total, 23);

        let outcome = api
            .process_unprocessed(&ProcessRequest { batch_size: 10, delay: 0 })
            .await
            .unwrap();
        assert_eq!(outcome.processed, 10);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let base = spawn_backend().await;
        let api = api(&base);

        let article = api.article_by_id("a1").await.unwrap();
        assert_eq!(article.title.as_deref(), Some("Hello"));

        let err = api.article_by_id("missing").await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
        assert_eq!(err.to_string(), "HTTP错误: 404 Not Found");

        // Unrouted endpoint
        let err = api.sentiments().await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }
}
