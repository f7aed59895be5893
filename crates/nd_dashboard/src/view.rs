use nd_core::{Article, FilterForm, Stats};

use crate::pagination::Pagination;

/// Rendered detail modal.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub article_id: String,
    pub body_html: String,
    /// `None` hides the original-article link.
    pub link: Option<String>,
}

/// Everything the dashboard page shows, region by region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub stats: Stats,
    pub sources: Vec<String>,
    pub sentiments: Vec<String>,
    pub form: FilterForm,
    pub loading: bool,
    /// Articles behind `articles_html`.
    pub articles: Vec<Article>,
    pub articles_html: String,
    pub article_count: String,
    pub pagination: Option<Pagination>,
    pub pagination_html: String,
    pub detail: Option<DetailView>,
    pub alert: Option<String>,
}
