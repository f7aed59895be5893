use std::time::Duration;

use nd_core::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Articles per list page.
    pub page_size: u32,
    /// Articles requested per bulk-processing call.
    pub batch_size: u32,
    /// Server-side pause between articles, forwarded as `delay`.
    pub batch_delay: u64,
    /// Extra batches allowed beyond `ceil(total / batch_size)`.
    pub iteration_slack: u32,
    /// How long the progress modal stays up after a task ends.
    pub dismiss_delay: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            batch_size: 10,
            batch_delay: 0,
            iteration_slack: 5,
            dismiss_delay: Duration::from_millis(1200),
        }
    }
}
