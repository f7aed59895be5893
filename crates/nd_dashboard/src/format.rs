use chrono::{DateTime, NaiveDate, NaiveDateTime};
use nd_core::Sentiment;
use url::Url;

pub const UNKNOWN: &str = "未知";
pub const INVALID_DATE: &str = "无效日期";

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn sentiment_class(sentiment: Option<Sentiment>) -> &'static str {
    match sentiment {
        Some(Sentiment::Positive) => "sentiment-positive",
        Some(Sentiment::Negative) => "sentiment-negative",
        Some(Sentiment::Neutral) => "sentiment-neutral",
        None => "",
    }
}

pub fn sentiment_text(sentiment: Option<Sentiment>) -> &'static str {
    match sentiment {
        Some(Sentiment::Positive) => "积极",
        Some(Sentiment::Negative) => "消极",
        Some(Sentiment::Neutral) => "中性",
        None => UNKNOWN,
    }
}

pub fn sentiment_label(label: &str) -> &'static str {
    sentiment_text(Sentiment::parse(label))
}

pub fn processed_badge(ai_processed: bool) -> (&'static str, &'static str) {
    if ai_processed {
        ("ai-processed-true", "已处理")
    } else {
        ("ai-processed-false", "未处理")
    }
}

/// Width (percent) and colour of the sentiment bar for a score in [-1, 1].
pub fn score_bar(score: f64) -> (f64, &'static str) {
    let score = score.clamp(-1.0, 1.0);
    let color = if score > 0.0 {
        "#28a745"
    } else if score < 0.0 {
        "#dc3545"
    } else {
        "#ffc107"
    };
    ((score + 1.0) * 50.0, color)
}

/// `YYYY/MM/DD HH:MM` in the timestamp's own wall time.
pub fn format_date(value: Option<&str>) -> String {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return UNKNOWN.to_string(),
    };
    match parse_timestamp(value) {
        Some(ts) => ts.format("%Y/%m/%d %H:%M").to_string(),
        None => {
            tracing::warn!("无效日期: {}", value);
            INVALID_DATE.to_string()
        }
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
}

/// The article link if it is an absolute http(s) URL.
pub fn safe_link(link: Option<&str>) -> Option<String> {
    let link = link?.trim();
    let url = Url::parse(link).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| link.to_string())
}
