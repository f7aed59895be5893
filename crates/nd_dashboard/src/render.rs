//! HTML fragments for every dashboard region.
//!
//! All article-derived text goes through [`html_escape`]; nothing from the
//! backend is interpolated raw.

use std::fmt::Write;

use nd_core::{Article, FilterForm, Stats};
use url::Url;

use crate::format::{
    format_date, html_escape, processed_badge, safe_link, score_bar, sentiment_class, sentiment_label,
    sentiment_text,
};
use crate::pagination::{PageItem, Pagination};
use crate::tasks::{ProgressModal, TaskControl, TaskPanel};
use crate::theme::Theme;
use crate::view::{DashboardView, DetailView};

/// Path of the detail page for `id`, with the id percent-encoded as one segment.
pub fn article_href(id: &str) -> String {
    let mut url = match Url::parse("http://localhost/articles") {
        Ok(url) => url,
        Err(_) => return "/articles".to_string(),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(id);
    }
    url.path().to_string()
}

pub fn render_stats(stats: &Stats) -> String {
    let cards = [
        ("total-articles", "文章总数", stats.total_articles),
        ("positive-sentiment", "积极", stats.sentiment_stats.positive),
        ("negative-sentiment", "消极", stats.sentiment_stats.negative),
        ("neutral-sentiment", "中性", stats.sentiment_stats.neutral),
    ];
    let mut html = String::from(r#"<div class="stats-row">"#);
    for (id, label, value) in cards {
        let _ = write!(
            html,
            r#"<div class="stat-card"><div class="stat-label">{}</div><div class="stat-value" id="{}">{}</div></div>"#,
            label, id, value
        );
    }
    html.push_str("</div>");
    html
}

fn render_options(values: &[String], selected: &str, label: impl Fn(&str) -> String) -> String {
    let mut html = String::from(r#"<option value="">全部</option>"#);
    for value in values {
        let _ = write!(
            html,
            r#"<option value="{}"{}>{}</option>"#,
            html_escape(value),
            if value == selected { " selected" } else { "" },
            html_escape(&label(value))
        );
    }
    html
}

pub fn render_filter_form(sources: &[String], sentiments: &[String], form: &FilterForm) -> String {
    let processed = [("", "全部"), ("true", "已处理"), ("false", "未处理")]
        .iter()
        .map(|(value, label)| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                value,
                if *value == form.ai_processed { " selected" } else { "" },
                label
            )
        })
        .collect::<String>();
    format!(
        r#"<form id="filter-form" method="post" action="/actions/filter">
    <select id="source-filter" name="source">{sources}</select>
    <select id="sentiment-filter" name="sentiment">{sentiments}</select>
    <input type="date" id="start-date" name="start_date" value="{start}">
    <input type="date" id="end-date" name="end_date" value="{end}">
    <select id="ai-processed-filter" name="ai_processed">{processed}</select>
    <button type="submit" class="btn btn-primary">筛选</button>
    <button type="submit" id="reset-filter" class="btn btn-outline-secondary" formaction="/actions/reset">重置</button>
</form>"#,
        sources = render_options(sources, &form.source, |s| s.to_string()),
        sentiments = render_options(sentiments, &form.sentiment, |s| sentiment_label(s).to_string()),
        start = html_escape(&form.start_date),
        end = html_escape(&form.end_date),
        processed = processed,
    )
}

fn render_keywords(article: &Article) -> String {
    article
        .keyword_list()
        .into_iter()
        .map(|k| format!(r#"<span class="keyword-tag">{}</span>"#, html_escape(k)))
        .collect()
}

fn render_score_bar(score: f64) -> String {
    let (width, color) = score_bar(score);
    format!(
        r#"<div class="sentiment-score-bar"><div class="sentiment-score-fill" style="width: {}%; background-color: {};"></div></div>"#,
        width, color
    )
}

fn render_author(article: &Article) -> String {
    match article.author.as_deref().filter(|a| !a.is_empty()) {
        Some(author) => format!(r#"<span class="ms-2">作者: {}</span>"#, html_escape(author)),
        None => String::new(),
    }
}

pub fn render_article_card(article: &Article) -> String {
    let sentiment = article.sentiment();
    let (processed_class, processed_text) = processed_badge(article.ai_processed);

    let sentiment_html = match article.sentiment.as_deref().filter(|s| !s.is_empty()) {
        Some(_) => {
            let score = article
                .sentiment_score
                .map(|score| {
                    format!(r#"<span class="ms-2">情感分数: {:.2}</span>{}"#, score, render_score_bar(score))
                })
                .unwrap_or_default();
            format!(
                r#"<div class="article-sentiment"><span class="sentiment-badge {}">{}</span>{}</div>"#,
                sentiment_class(sentiment),
                sentiment_text(sentiment),
                score
            )
        }
        None => String::new(),
    };

    let chinese_summary = match article.chinese_summary.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(summary) => format!(
            r#"<div class="article-chinese-summary"><strong>中文摘要:</strong> {}</div>"#,
            html_escape(summary)
        ),
        None => String::new(),
    };

    format!(
        r#"<div class="article-card card" data-article-id="{id}">
    <div class="card-body">
        <div class="article-header">
            <div>
                <div class="article-title">{title}</div>
                <div class="article-meta">
                    <span class="source-badge">{source}</span>
                    <span class="ms-2">{published}</span>{author}
                </div>
            </div>
            <div><span class="ai-processed-badge {processed_class}">{processed_text}</span></div>
        </div>
        <div class="article-summary">{summary}</div>
        {chinese_summary}{sentiment_html}
        <div class="article-footer">
            <div>{keywords}</div>
            <div><a class="btn btn-sm btn-outline-primary" href="{href}"><i class="bi bi-eye"></i> 查看详情</a></div>
        </div>
    </div>
</div>
"#,
        id = html_escape(&article.id),
        title = html_escape(article.title.as_deref().unwrap_or("无标题")),
        source = html_escape(article.source.as_deref().unwrap_or("未知来源")),
        published = format_date(article.published.as_deref()),
        author = render_author(article),
        processed_class = processed_class,
        processed_text = processed_text,
        summary = html_escape(article.summary.as_deref().filter(|s| !s.is_empty()).unwrap_or("无摘要")),
        chinese_summary = chinese_summary,
        sentiment_html = sentiment_html,
        keywords = render_keywords(article),
        href = html_escape(&article_href(&article.id)),
    )
}

pub fn render_articles(articles: &[Article]) -> String {
    if articles.is_empty() {
        return r#"<div class="empty-state"><i class="bi bi-inbox"></i><h5>没有找到文章</h5><p>请尝试调整筛选条件</p></div>"#
            .to_string();
    }
    articles.iter().map(render_article_card).collect()
}

pub fn render_list_error(message: &str) -> String {
    format!(r#"<div class="alert alert-danger">加载文章失败: {}</div>"#, html_escape(message))
}

pub fn render_pagination(pagination: Option<&Pagination>) -> String {
    let pagination = match pagination {
        Some(p) => p,
        None => return String::new(),
    };
    let link = |target: u32, disabled: bool, active: bool, label: &str| {
        format!(
            r#"<li class="page-item{}{}"><button class="page-link" data-page="{}" formaction="/actions/page/{}"{}>{}</button></li>"#,
            if disabled { " disabled" } else { "" },
            if active { " active" } else { "" },
            target,
            target,
            if disabled { " disabled" } else { "" },
            label
        )
    };

    let mut html = String::from(r#"<form method="post"><ul class="pagination">"#);
    html.push_str(&link(pagination.prev.target, pagination.prev.disabled, false, "上一页"));
    for item in &pagination.items {
        match item {
            PageItem::Page { number, active } => html.push_str(&link(*number, false, *active, &number.to_string())),
            PageItem::Ellipsis => {
                html.push_str(r#"<li class="page-item disabled"><span class="page-link">...</span></li>"#)
            }
        }
    }
    html.push_str(&link(pagination.next.target, pagination.next.disabled, false, "下一页"));
    html.push_str("</ul></form>");
    html
}

fn detail_section(title: &str, body: &str) -> String {
    format!(
        r#"<div class="article-detail-section"><div class="article-detail-title">{}</div><div>{}</div></div>"#,
        title, body
    )
}

pub fn render_article_detail(article: &Article) -> DetailView {
    let sentiment = article.sentiment();
    let (processed_class, processed_text) = processed_badge(article.ai_processed);
    let mut html = String::new();

    html.push_str(&detail_section("标题", &html_escape(article.title.as_deref().unwrap_or("无标题"))));
    html.push_str(&detail_section(
        "来源",
        &format!(
            r#"<span class="source-badge">{}</span>{}"#,
            html_escape(article.source.as_deref().unwrap_or("未知来源")),
            render_author(article)
        ),
    ));
    html.push_str(&detail_section("发布时间", &format_date(article.published.as_deref())));
    html.push_str(&detail_section(
        "摘要",
        &html_escape(article.summary.as_deref().filter(|s| !s.is_empty()).unwrap_or("无摘要")),
    ));
    if let Some(summary) = article.chinese_summary.as_deref().filter(|s| !s.trim().is_empty()) {
        html.push_str(&detail_section("中文摘要", &html_escape(summary)));
    }
    match article.content.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(content) => html.push_str(&detail_section("内容", &html_escape(content))),
        None => html.push_str(&detail_section("内容", r#"<span class="text-muted">文章内容暂不可用</span>"#)),
    }

    let mut analysis = match article.sentiment.as_deref() {
        Some(_) => format!(
            r#"<span class="sentiment-badge {}">{}</span>"#,
            sentiment_class(sentiment),
            sentiment_text(sentiment)
        ),
        None => r#"<span class="text-muted">暂无情感分析</span>"#.to_string(),
    };
    if let Some(score) = article.sentiment_score {
        let _ = write!(analysis, r#"<span class="ms-2">情感分数: {:.2}</span>"#, score);
    }
    html.push_str(&detail_section("情感分析", &analysis));

    let keywords = render_keywords(article);
    if !keywords.is_empty() {
        html.push_str(&detail_section("关键词", &keywords));
    }
    html.push_str(&detail_section(
        "处理状态",
        &format!(r#"<span class="ai-processed-badge {}">{}</span>"#, processed_class, processed_text),
    ));
    html.push_str(&detail_section(
        "记录时间",
        &format!(
            "创建时间: {}<br>更新时间: {}",
            format_date(article.created_at.as_deref()),
            format_date(article.updated_at.as_deref())
        ),
    ));

    DetailView {
        article_id: article.id.clone(),
        body_html: html,
        link: safe_link(article.link.as_deref()),
    }
}

pub fn render_detail_modal(detail: &DetailView) -> String {
    let link = match &detail.link {
        Some(href) => format!(
            r#"<a id="article-link" class="btn btn-primary" href="{}" target="_blank" rel="noopener noreferrer" style="display: inline-block;">查看原文</a>"#,
            html_escape(href)
        ),
        None => r#"<a id="article-link" class="btn btn-primary" style="display: none;">查看原文</a>"#.to_string(),
    };
    format!(
        r#"<div class="modal show" id="articleModal" style="display: block;">
    <div class="modal-dialog modal-lg"><div class="modal-content">
        <div class="modal-header"><h5 class="modal-title">文章详情</h5></div>
        <div class="modal-body" id="article-modal-body">{body}</div>
        <div class="modal-footer">{link}<a class="btn btn-secondary" href="/">关闭</a></div>
    </div></div>
</div>"#,
        body = detail.body_html,
        link = link,
    )
}

pub fn render_task_button(control: &TaskControl) -> String {
    let spinner = if control.busy {
        r#"<span class="spinner-border spinner-border-sm" role="status"></span> "#
    } else {
        ""
    };
    format!(
        r#"<form method="post" action="{}"><button type="submit" id="{}" class="btn btn-outline-light"{}>{}{}</button></form>"#,
        control.kind.action(),
        control.kind.button_id(),
        if control.busy { " disabled" } else { "" },
        spinner,
        html_escape(&control.label)
    )
}

pub fn render_progress_modal(modal: &ProgressModal) -> String {
    if !modal.open {
        return String::new();
    }
    let mut classes = String::from("progress-bar");
    if modal.striped {
        classes.push_str(" progress-bar-striped progress-bar-animated");
    }
    if modal.error {
        classes.push_str(" bg-danger");
    }
    let cancel = if modal.cancellable {
        r#"<form method="post" action="/actions/cancel"><button class="btn btn-sm btn-outline-secondary">取消</button></form>"#
    } else {
        ""
    };
    format!(
        r#"<div class="modal show" id="taskProgressModal" style="display: block;">
    <div class="modal-dialog"><div class="modal-content"><div class="modal-body">
        <h6>{title}</h6>
        <div class="progress"><div id="task-progress-bar" class="{classes}" role="progressbar" style="width: {pct}%;" aria-valuenow="{pct}">{pct}%</div></div>
        <div id="task-status" class="mt-2{error}">{message}</div>{cancel}
    </div></div></div>
</div>"#,
        title = html_escape(&modal.title),
        classes = classes,
        pct = modal.pct,
        error = if modal.error { " text-danger" } else { "" },
        message = html_escape(&modal.message),
        cancel = cancel,
    )
}

pub fn render_theme_toggle(theme: Theme) -> String {
    format!(
        r#"<form method="post" action="/actions/theme"><button type="submit" id="theme-toggle" class="btn btn-outline-light"><i class="bi {}"></i> <span id="theme-toggle-label">{}</span></button></form>"#,
        theme.icon(),
        theme.label()
    )
}

pub fn render_alert(message: &str) -> String {
    format!(
        r#"<div class="alert alert-warning" role="alert">{}<a class="btn-close" href="/actions/dismiss"></a></div>"#,
        html_escape(message)
    )
}

/// The whole dashboard document.
pub fn render_page(view: &DashboardView, panel: &TaskPanel, theme: Theme) -> String {
    let refresh = if panel.modal.open || panel.any_busy() {
        r#"<meta http-equiv="refresh" content="1">"#
    } else {
        ""
    };
    let loading = if view.loading {
        r#"<div id="loading" class="text-center">加载中...</div>"#
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN" data-theme="{theme}">
<head>
<meta charset="utf-8">
<title>新闻分析仪表盘</title>
{refresh}<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css">
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.10.5/font/bootstrap-icons.css">
</head>
<body>
<nav class="navbar">
    <a id="home-link" class="navbar-brand" href="/">新闻分析仪表盘</a>
    <div class="navbar-actions">{process}{fetch}{toggle}</div>
</nav>
<main class="container">
{alert}<section id="stats">{stats}</section>
<section id="filters">{filters}</section>
<section id="articles">
    <div class="list-header"><span id="article-count">{count}</span></div>
    {loading}<div id="articles-container">{articles}</div>
    <nav id="pagination-container">{pagination}</nav>
</section>
</main>
{detail}{progress}
</body>
</html>
"#,
        theme = theme.as_str(),
        refresh = refresh,
        process = render_task_button(&panel.process),
        fetch = render_task_button(&panel.fetch),
        toggle = render_theme_toggle(theme),
        alert = view.alert.as_deref().map(render_alert).unwrap_or_default(),
        stats = render_stats(&view.stats),
        filters = render_filter_form(&view.sources, &view.sentiments, &view.form),
        count = html_escape(&view.article_count),
        loading = loading,
        articles = view.articles_html,
        pagination = view.pagination_html,
        detail = view.detail.as_ref().map(render_detail_modal).unwrap_or_default(),
        progress = render_progress_modal(&panel.modal),
    )
}
