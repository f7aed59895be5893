pub mod config;
pub mod controller;
pub mod format;
pub mod pagination;
pub mod render;
pub mod tasks;
pub mod theme;
pub mod view;

pub use config::DashboardConfig;
pub use controller::{DashboardController, PendingLoad};
pub use pagination::{PageItem, Pagination};
pub use tasks::{
    BulkProcess, BulkState, BulkSummary, CancelHandle, SharedTaskPanel, TaskKind, TaskPanel, TaskProgress,
    TaskReporter, TaskRunner, TaskSummary,
};
pub use theme::{FileThemeStore, MemoryThemeStore, Theme, ThemeStore, ThemeToggle};
pub use view::{DashboardView, DetailView};

pub mod prelude {
    pub use super::{DashboardConfig, DashboardController, TaskKind, TaskRunner, Theme, ThemeToggle};
    pub use nd_core::{Article, Error, FilterForm, NewsApi, Result};
}
