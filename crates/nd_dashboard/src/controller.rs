//! Dashboard controller: owns page and filter state and keeps the rendered
//! regions in step with it.
//!
//! Every state change is followed by a list reload. Loads are numbered and a
//! completion only lands if it belongs to the most recent load issued.

use std::sync::Arc;

use nd_core::{Article, ArticlePage, ArticleQuery, FilterForm, FilterState, NewsApi, PageState, Result, Stats};
use tracing::{debug, error, info};

use crate::config::DashboardConfig;
use crate::pagination::Pagination;
use crate::render::{render_article_detail, render_articles, render_list_error, render_pagination};
use crate::view::DashboardView;

/// A list request that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub seq: u64,
    pub query: ArticleQuery,
}

impl PendingLoad {
    pub async fn fetch(&self, api: &dyn NewsApi) -> Result<ArticlePage> {
        api.articles(&self.query).await
    }
}

pub struct DashboardController {
    api: Arc<dyn NewsApi>,
    page: PageState,
    filters: FilterState,
    issued: u64,
    view: DashboardView,
}

impl DashboardController {
    pub fn new(api: Arc<dyn NewsApi>, config: &DashboardConfig) -> Self {
        Self {
            api,
            page: PageState::new(config.page_size),
            filters: FilterState::default(),
            issued: 0,
            view: DashboardView::default(),
        }
    }

    pub fn api(&self) -> Arc<dyn NewsApi> {
        self.api.clone()
    }

    pub fn current_page(&self) -> u32 {
        self.page.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page.page_size
    }

    pub fn total_articles(&self) -> u64 {
        self.page.total_articles
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Stats, filter options, then the first page of articles.
    pub async fn initialize(&mut self) {
        let _ = self.load_stats().await;
        let _ = self.load_filter_options().await;
        self.load_articles().await;
    }

    /// Stats and list, after a background task changed the data.
    pub async fn refresh(&mut self) {
        let _ = self.load_stats().await;
        self.load_articles().await;
    }

    pub async fn load_stats(&mut self) -> Result<()> {
        let result = self.api.stats().await;
        self.apply_stats(result)
    }

    /// Render fetched stats. A failure leaves the previous values in place.
    pub fn apply_stats(&mut self, result: Result<Stats>) -> Result<()> {
        match result {
            Ok(stats) => {
                self.view.stats = stats;
                Ok(())
            }
            Err(e) => {
                error!("加载统计数据失败: {}", e);
                Err(e)
            }
        }
    }

    pub async fn load_filter_options(&mut self) -> Result<()> {
        let result = async {
            let sources = self.api.sources().await?;
            let sentiments = self.api.sentiments().await?;
            Ok::<_, nd_core::Error>((sources, sentiments))
        }
        .await;
        match result {
            Ok((sources, sentiments)) => {
                self.view.sources = sources;
                self.view.sentiments = sentiments;
                Ok(())
            }
            Err(e) => {
                error!("加载筛选选项失败: {}", e);
                Err(e)
            }
        }
    }

    /// Issue a list load for the current state.
    pub fn begin_load(&mut self) -> PendingLoad {
        self.issued += 1;
        self.view.loading = true;
        let load = PendingLoad {
            seq: self.issued,
            query: ArticleQuery {
                page: self.page.current_page,
                page_size: self.page.page_size,
                filters: self.filters.clone(),
            },
        };
        debug!("Issued article load #{}: {:?}", load.seq, load.query);
        load
    }

    /// Apply a load result. Returns false if a newer load was issued since.
    pub fn complete_load(&mut self, load: &PendingLoad, result: Result<ArticlePage>) -> bool {
        if load.seq != self.issued {
            debug!("Discarding stale article load #{} (latest #{})", load.seq, self.issued);
            return false;
        }
        self.view.loading = false;
        match result {
            Ok(page) => {
                self.page.total_articles = page.total;
                self.view.article_count = format!("{} 篇文章", page.total);
                self.view.articles_html = render_articles(&page.articles);
                self.view.articles = page.articles;
                self.render_pagination();
            }
            Err(e) => {
                error!("加载文章失败: {}", e);
                self.view.articles_html = render_list_error(&e.to_string());
            }
        }
        true
    }

    pub async fn load_articles(&mut self) -> bool {
        let load = self.begin_load();
        let result = load.fetch(self.api.as_ref()).await;
        self.complete_load(&load, result)
    }

    fn render_pagination(&mut self) {
        let pagination = Pagination::compute(self.page.current_page, self.page.total_pages());
        self.view.pagination_html = render_pagination(pagination.as_ref());
        self.view.pagination = pagination;
    }

    /// Store the submitted form as the active filters and start over at page 1.
    pub fn set_filters(&mut self, form: FilterForm) -> PendingLoad {
        info!("🔎 Applying filters: {:?}", form);
        self.filters = FilterState::from_form(&form);
        self.view.form = form;
        self.page.current_page = 1;
        self.begin_load()
    }

    pub async fn apply_filters(&mut self, form: FilterForm) -> bool {
        let load = self.set_filters(form);
        let result = load.fetch(self.api.as_ref()).await;
        self.complete_load(&load, result)
    }

    pub fn clear_filters(&mut self) -> PendingLoad {
        self.filters = FilterState::default();
        self.view.form = FilterForm::default();
        self.page.current_page = 1;
        self.begin_load()
    }

    pub async fn reset_filters(&mut self) -> bool {
        let load = self.clear_filters();
        let result = load.fetch(self.api.as_ref()).await;
        self.complete_load(&load, result)
    }

    /// Move to `page`, or `None` if it is the current page or out of range.
    pub fn set_page(&mut self, page: u32) -> Option<PendingLoad> {
        if page == 0 || page == self.page.current_page || page > self.page.total_pages() {
            return None;
        }
        self.page.current_page = page;
        Some(self.begin_load())
    }

    pub async fn go_to_page(&mut self, page: u32) -> bool {
        match self.set_page(page) {
            Some(load) => {
                let result = load.fetch(self.api.as_ref()).await;
                self.complete_load(&load, result)
            }
            None => false,
        }
    }

    /// Load one article into the detail view, or raise an alert on failure.
    pub async fn show_article(&mut self, id: &str) -> Result<()> {
        let result = self.api.article_by_id(id).await;
        self.apply_article(result)
    }

    pub fn apply_article(&mut self, result: Result<Article>) -> Result<()> {
        match result {
            Ok(article) => {
                self.view.detail = Some(render_article_detail(&article));
                Ok(())
            }
            Err(e) => {
                error!("加载文章详情失败: {}", e);
                self.view.detail = None;
                self.view.alert = Some(format!("加载文章详情失败: {}", e));
                Err(e)
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.view.detail = None;
    }

    pub fn dismiss_alert(&mut self) {
        self.view.alert = None;
    }
}
