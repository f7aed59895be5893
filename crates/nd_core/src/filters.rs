use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Raw values of the five filter form fields. Empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterForm {
    pub source: String,
    pub sentiment: String,
    pub start_date: String,
    pub end_date: String,
    pub ai_processed: String,
}

/// Filters behind the current article list.
///
/// `None` means the key is absent (after a reset), `Some("")` means the field
/// was submitted empty. Both count as unset when building a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_processed: Option<String>,
}

impl FilterState {
    pub fn from_form(form: &FilterForm) -> Self {
        Self {
            source: Some(form.source.clone()),
            sentiment: Some(form.sentiment.clone()),
            start_date: Some(form.start_date.clone()),
            end_date: Some(form.end_date.clone()),
            ai_processed: Some(form.ai_processed.clone()),
        }
    }

    /// True when no key is present at all.
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }

    /// Set fields in query order. Values are raw; encoding is the caller's job.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("source", &self.source),
            ("sentiment", &self.sentiment),
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
            ("ai_processed", &self.ai_processed),
        ]
        .into_iter()
        .filter_map(|(key, value)| match value.as_deref() {
            Some(v) if !v.is_empty() => Some((key, v)),
            _ => None,
        })
        .collect()
    }

    pub fn to_form(&self) -> FilterForm {
        FilterForm {
            source: self.source.clone().unwrap_or_default(),
            sentiment: self.sentiment.clone().unwrap_or_default(),
            start_date: self.start_date.clone().unwrap_or_default(),
            end_date: self.end_date.clone().unwrap_or_default(),
            ai_processed: self.ai_processed.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
    pub page_size: u32,
    pub total_articles: u64,
}

impl PageState {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_articles: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let size = u64::from(self.page_size.max(1));
        let pages = (self.total_articles + size - 1) / size;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// One list request: page window plus the filters in force when it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub page: u32,
    pub page_size: u32,
    pub filters: FilterState,
}

impl ArticleQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        pairs.extend(
            self.filters
                .query_pairs()
                .into_iter()
                .map(|(key, value)| (key, value.to_string())),
        );
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applied_filters_keep_every_key() {
        let form = FilterForm {
            source: "CoinDesk".to_string(),
            ..Default::default()
        };
        let state = FilterState::from_form(&form);
        assert_eq!(state.sentiment.as_deref(), Some(""));
        assert_eq!(state.ai_processed.as_deref(), Some(""));
        assert!(!state.is_cleared());
        assert_eq!(state.query_pairs(), vec![("source", "CoinDesk")]);
    }

    #[test]
    fn test_cleared_filters_add_nothing() {
        let state = FilterState::default();
        assert!(state.is_cleared());
        assert!(state.query_pairs().is_empty());
    }

    #[test]
    fn test_ai_processed_false_is_set() {
        let form = FilterForm {
            ai_processed: "false".to_string(),
            start_date: "not-a-date".to_string(),
            ..Default::default()
        };
        let state = FilterState::from_form(&form);
        let pairs = state.query_pairs();
        assert_eq!(pairs, vec![("start_date", "not-a-date"), ("ai_processed", "false")]);
    }

    #[test]
    fn test_total_pages() {
        let mut page = PageState::default();
        assert_eq!(page.total_pages(), 0);
        page.total_articles = 10;
        assert_eq!(page.total_pages(), 1);
        page.total_articles = 23;
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_article_query_pairs_lead_with_page() {
        let query = ArticleQuery {
            page: 2,
            page_size: 10,
            filters: FilterState {
                sentiment: Some("negative".to_string()),
                ..Default::default()
            },
        };
        assert_eq!(
            query.query_pairs(),
            vec![
                ("page", "2".to_string()),
                ("page_size", "10".to_string()),
                ("sentiment", "negative".to_string()),
            ]
        );
    }
}
