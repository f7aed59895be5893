use std::sync::Arc;

use nd_core::NewsApi;
use nd_dashboard::{
    CancelHandle, DashboardConfig, DashboardController, SharedTaskPanel, TaskRunner, ThemeStore, ThemeToggle,
};
use tokio::sync::Mutex;

pub struct AppState {
    pub controller: Mutex<DashboardController>,
    pub tasks: TaskRunner,
    pub panel: SharedTaskPanel,
    pub theme: Mutex<ThemeToggle>,
    pub cancel: CancelHandle,
}

impl AppState {
    /// Build the state and load the first dashboard render.
    pub async fn new(api: Arc<dyn NewsApi>, config: DashboardConfig, theme_store: Arc<dyn ThemeStore>) -> Self {
        let panel = SharedTaskPanel::new();
        let mut controller = DashboardController::new(api.clone(), &config);
        controller.initialize().await;
        Self {
            controller: Mutex::new(controller),
            tasks: TaskRunner::new(api, config, Arc::new(panel.clone())),
            panel,
            theme: Mutex::new(ThemeToggle::load(theme_store).await),
            cancel: CancelHandle::new(),
        }
    }
}
