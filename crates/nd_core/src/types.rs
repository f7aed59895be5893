use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub chinese_summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    /// Comma-joined keyword list.
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub ai_processed: bool,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Article {
    pub fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(Sentiment::parse)
    }

    /// Trimmed, non-empty keywords.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .map(|k| k.split(',').map(str::trim).filter(|k| !k.is_empty()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentStats {
    #[serde(default)]
    pub positive: u64,
    #[serde(default)]
    pub negative: u64,
    #[serde(default)]
    pub neutral: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_articles: u64,
    #[serde(default)]
    pub processed_articles: u64,
    #[serde(default)]
    pub unprocessed_articles: u64,
    #[serde(default)]
    pub sentiment_stats: SentimentStats,
    #[serde(default)]
    pub source_stats: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticlePage {
    #[serde(default)]
    pub total: u64,
    #[serde(default, deserialize_with = "lenient_articles")]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

// A missing, null or non-array `articles` field reads as an empty list.
// Malformed entries inside a real array are still decode errors.
fn lenient_articles<'de, D>(deserializer: D) -> std::result::Result<Vec<Article>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        Some(other) => {
            tracing::warn!("articles is not an array: {}", other);
            Ok(Vec::new())
        }
        None => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub batch_size: u32,
    pub delay: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOutcome {
    #[serde(default)]
    pub total_articles: u64,
    #[serde(default)]
    pub unprocessed_articles: u64,
    #[serde(default)]
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_page_defaults_missing_articles() {
        let page: ArticlePage = serde_json::from_str(r#"{"total": 23}"#).unwrap();
        assert_eq!(page.total, 23);
        assert!(page.articles.is_empty());

        let page: ArticlePage = serde_json::from_str(r#"{"total": 2, "articles": {"oops": 1}}"#).unwrap();
        assert!(page.articles.is_empty());

        let page: ArticlePage = serde_json::from_str(r#"{"total": 2, "articles": null}"#).unwrap();
        assert!(page.articles.is_empty());
    }

    #[test]
    fn test_article_page_rejects_malformed_entries() {
        let result = serde_json::from_str::<ArticlePage>(r#"{"total": 1, "articles": [{"title": "no id"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_article_optional_fields() {
        let article: Article = serde_json::from_str(
            r#"{"id": "a1", "title": "Bitcoin", "sentiment": "positive", "sentiment_score": 0.5,
                "keywords": "btc, etf ,, price", "ai_processed": true}"#,
        )
        .unwrap();
        assert_eq!(article.sentiment(), Some(Sentiment::Positive));
        assert_eq!(article.keyword_list(), vec!["btc", "etf", "price"]);
        assert!(article.link.is_none());
        assert!(article.ai_processed);
    }

    #[test]
    fn test_stats_tolerates_partial_sentiment_counts() {
        let stats: Stats = serde_json::from_str(
            r#"{"total_articles": 40, "unprocessed_articles": 25, "sentiment_stats": {"positive": 7}}"#,
        )
        .unwrap();
        assert_eq!(stats.sentiment_stats.positive, 7);
        assert_eq!(stats.sentiment_stats.negative, 0);
        assert_eq!(stats.unprocessed_articles, 25);
    }

    #[test]
    fn test_task_status_finished() {
        let status: TaskStatus =
            serde_json::from_str(r#"{"type": "process", "status": "running"}"#).unwrap();
        assert!(!status.is_finished());
        let status: TaskStatus =
            serde_json::from_str(r#"{"type": "fetch", "status": "failed", "detail": {"error": "boom"}}"#).unwrap();
        assert!(status.is_finished());
    }
}
