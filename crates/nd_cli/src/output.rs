use nd_core::{Article, Stats};
use nd_dashboard::format::{format_date, processed_badge, safe_link, sentiment_text};
use nd_dashboard::{PageItem, Pagination};

pub fn stats_lines(stats: &Stats) -> Vec<String> {
    vec![
        format!("文章总数: {}", stats.total_articles),
        format!("未处理: {}", stats.unprocessed_articles),
        format!(
            "积极: {}  消极: {}  中性: {}",
            stats.sentiment_stats.positive, stats.sentiment_stats.negative, stats.sentiment_stats.neutral
        ),
    ]
}

pub fn article_line(article: &Article) -> String {
    let sentiment = match (article.sentiment.as_deref(), article.sentiment_score) {
        (Some(_), Some(score)) => format!(" [{} {:.2}]", sentiment_text(article.sentiment()), score),
        (Some(_), None) => format!(" [{}]", sentiment_text(article.sentiment())),
        _ => String::new(),
    };
    format!(
        "{}  {}  {} ({}){} {}",
        article.id,
        format_date(article.published.as_deref()),
        article.title.as_deref().unwrap_or("无标题"),
        article.source.as_deref().unwrap_or("未知来源"),
        sentiment,
        processed_badge(article.ai_processed).1,
    )
}

/// `‹ 1 … 3 4 [5] 6 7 … 10 ›`, or nothing for a single page.
pub fn pagination_line(pagination: Option<&Pagination>) -> String {
    let pagination = match pagination {
        Some(p) => p,
        None => return String::new(),
    };
    let mut parts = vec![if pagination.prev.disabled { " " } else { "‹" }.to_string()];
    for item in &pagination.items {
        parts.push(match item {
            PageItem::Page { number, active: true } => format!("[{}]", number),
            PageItem::Page { number, .. } => number.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        });
    }
    parts.push(if pagination.next.disabled { " " } else { "›" }.to_string());
    parts.join(" ")
}

pub fn detail_lines(article: &Article) -> Vec<String> {
    let mut lines = vec![
        format!("标题: {}", article.title.as_deref().unwrap_or("无标题")),
        format!("来源: {}", article.source.as_deref().unwrap_or("未知来源")),
        format!("发布时间: {}", format_date(article.published.as_deref())),
        format!("摘要: {}", article.summary.as_deref().filter(|s| !s.is_empty()).unwrap_or("无摘要")),
    ];
    if let Some(author) = article.author.as_deref() {
        lines.push(format!("作者: {}", author));
    }
    if let Some(summary) = article.chinese_summary.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(format!("中文摘要: {}", summary));
    }
    lines.push(format!("情感: {}", sentiment_text(article.sentiment())));
    if let Some(score) = article.sentiment_score {
        lines.push(format!("情感分数: {:.2}", score));
    }
    let keywords = article.keyword_list();
    if !keywords.is_empty() {
        lines.push(format!("关键词: {}", keywords.join(", ")));
    }
    lines.push(format!("处理状态: {}", processed_badge(article.ai_processed).1));
    if let Some(link) = safe_link(article.link.as_deref()) {
        lines.push(format!("原文: {}", link));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_line() {
        assert_eq!(pagination_line(None), "");
        let p = Pagination::compute(5, 10).unwrap();
        assert_eq!(pagination_line(Some(&p)), "‹ 1 … 3 4 [5] 6 7 … 10 ›");
        let p = Pagination::compute(1, 2).unwrap();
        assert_eq!(pagination_line(Some(&p)), "  [1] 2 ›");
    }

    #[test]
    fn test_detail_hides_unsafe_link() {
        let article = Article {
            id: "a1".to_string(),
            link: Some("javascript:alert(1)".to_string()),
            ..Default::default()
        };
        assert!(!detail_lines(&article).iter().any(|l| l.starts_with("原文")));
    }

    #[test]
    fn test_article_line() {
        let article = Article {
            id: "a1".to_string(),
            title: Some("ETF inflows".to_string()),
            source: Some("CoinDesk".to_string()),
            published: Some("2024-03-05T09:07:00".to_string()),
            sentiment: Some("negative".to_string()),
            sentiment_score: Some(-0.25),
            ..Default::default()
        };
        assert_eq!(article_line(&article), "a1  2024/03/05 09:07  ETF inflows (CoinDesk) [消极 -0.25] 未处理");
    }
}
