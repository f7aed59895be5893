//! Long-running backend jobs: bulk AI processing and on-demand fetching.
//!
//! Bulk processing is a bounded state machine. [`BulkProcess`] holds the
//! transitions, [`TaskRunner`] drives it against a [`NewsApi`] and reports
//! through a [`TaskReporter`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use nd_core::{Error, FetchOutcome, NewsApi, ProcessRequest, Result};
use tracing::{error, info, warn};

use crate::config::DashboardConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Process,
    Fetch,
}

impl TaskKind {
    pub fn idle_label(&self) -> &'static str {
        match self {
            Self::Process => "批量AI处理",
            Self::Fetch => "抓取最新文章",
        }
    }

    pub fn busy_label(&self) -> &'static str {
        match self {
            Self::Process => "处理中...",
            Self::Fetch => "抓取中...",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Process => "批量处理未处理文章",
            Self::Fetch => "抓取最新文章",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Process => "/actions/process",
            Self::Fetch => "/actions/fetch",
        }
    }

    pub fn button_id(&self) -> &'static str {
        match self {
            Self::Process => "process-unprocessed-btn",
            Self::Fetch => "fetch-latest-btn",
        }
    }
}

/// Ephemeral progress of one bulk run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskProgress {
    pub processed_sum: u64,
    pub total_unprocessed: u64,
    pub pct: u8,
}

impl TaskProgress {
    pub fn new(processed_sum: u64, total_unprocessed: u64) -> Self {
        Self {
            processed_sum,
            total_unprocessed,
            pct: percent(processed_sum, total_unprocessed),
        }
    }
}

/// `min(100, round(done / total * 100))`; an empty total counts as complete.
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (done as f64 / total as f64 * 100.0).round();
    pct.min(100.0) as u8
}

/// Most batches a run may issue: `ceil(total / batch_size) + slack`.
pub fn iteration_cap(total: u64, batch_size: u32, slack: u32) -> u64 {
    let batch = u64::from(batch_size.max(1));
    (total + batch - 1) / batch + u64::from(slack)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkState {
    Idle,
    ComputingTotal,
    Batching { processed: u64, total: u64, iterations: u64 },
    Done { processed: u64, total: u64, iterations: u64 },
    Failed { processed: u64, total: u64, error: String },
    Cancelled { processed: u64, total: u64 },
}

#[derive(Debug, Clone)]
pub struct BulkProcess {
    state: BulkState,
    batch_size: u32,
    delay: u64,
    slack: u32,
    cap: u64,
}

impl BulkProcess {
    pub fn new(batch_size: u32, delay: u64, slack: u32) -> Self {
        Self {
            state: BulkState::Idle,
            batch_size: batch_size.max(1),
            delay,
            slack,
            cap: 0,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.batch_size, config.batch_delay, config.iteration_slack)
    }

    pub fn state(&self) -> &BulkState {
        &self.state
    }

    pub fn cap(&self) -> u64 {
        self.cap
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            BulkState::Done { .. } | BulkState::Failed { .. } | BulkState::Cancelled { .. }
        )
    }

    pub fn start(&mut self) {
        if self.state == BulkState::Idle {
            self.state = BulkState::ComputingTotal;
        }
    }

    pub fn on_total(&mut self, total: u64) {
        if self.state != BulkState::ComputingTotal {
            return;
        }
        self.cap = iteration_cap(total, self.batch_size, self.slack);
        self.state = if total == 0 {
            BulkState::Done { processed: 0, total: 0, iterations: 0 }
        } else {
            BulkState::Batching { processed: 0, total, iterations: 0 }
        };
    }

    /// The next batch to request, or `None` once no more batches may be sent.
    pub fn next_request(&self) -> Option<ProcessRequest> {
        match self.state {
            BulkState::Batching { iterations, .. } if iterations < self.cap => Some(ProcessRequest {
                batch_size: self.batch_size,
                delay: self.delay,
            }),
            _ => None,
        }
    }

    pub fn on_batch(&mut self, batch: u64) {
        if let BulkState::Batching { processed, total, iterations } = self.state {
            let processed = processed + batch;
            let iterations = iterations + 1;
            self.state = if batch == 0 || processed >= total || iterations >= self.cap {
                BulkState::Done { processed, total, iterations }
            } else {
                BulkState::Batching { processed, total, iterations }
            };
        }
    }

    pub fn on_error(&mut self, message: impl Into<String>) {
        if !self.is_terminal() {
            let progress = self.progress();
            self.state = BulkState::Failed {
                processed: progress.processed_sum,
                total: progress.total_unprocessed,
                error: message.into(),
            };
        }
    }

    pub fn cancel(&mut self) {
        if !self.is_terminal() {
            let progress = self.progress();
            self.state = BulkState::Cancelled {
                processed: progress.processed_sum,
                total: progress.total_unprocessed,
            };
        }
    }

    pub fn progress(&self) -> TaskProgress {
        match self.state {
            BulkState::Idle | BulkState::ComputingTotal => TaskProgress {
                processed_sum: 0,
                total_unprocessed: 0,
                pct: 0,
            },
            BulkState::Batching { processed, total, .. }
            | BulkState::Done { processed, total, .. }
            | BulkState::Failed { processed, total, .. }
            | BulkState::Cancelled { processed, total } => TaskProgress::new(processed, total),
        }
    }
}

/// Stops a bulk run between batches.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Where task feedback goes: the progress modal, a terminal, ...
///
/// Every call names the task it comes from, since process and fetch can run
/// side by side.
pub trait TaskReporter: Send + Sync {
    /// Disable the trigger and open the modal. Fails if `kind` is already running.
    fn begin(&self, kind: TaskKind) -> Result<()>;
    fn progress(&self, kind: TaskKind, pct: u8, message: &str);
    fn complete(&self, kind: TaskKind, message: &str);
    fn fail(&self, kind: TaskKind, message: &str);
    /// Re-enable the trigger and restore its label.
    fn restore(&self, kind: TaskKind);
    /// Close the modal if `kind` still owns it.
    fn dismiss(&self, kind: TaskKind);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskControl {
    pub kind: TaskKind,
    pub label: String,
    pub busy: bool,
}

impl TaskControl {
    fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            label: kind.idle_label().to_string(),
            busy: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressModal {
    pub open: bool,
    /// Task whose progress is on display.
    pub owner: Option<TaskKind>,
    pub title: String,
    pub pct: u8,
    pub striped: bool,
    pub error: bool,
    pub cancellable: bool,
    pub message: String,
}

impl ProgressModal {
    fn opened_for(kind: TaskKind) -> Self {
        Self {
            open: true,
            owner: Some(kind),
            title: kind.title().to_string(),
            pct: 0,
            striped: true,
            error: false,
            cancellable: kind == TaskKind::Process,
            message: "准备中...".to_string(),
        }
    }
}

/// Trigger buttons plus the shared progress modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPanel {
    pub process: TaskControl,
    pub fetch: TaskControl,
    pub modal: ProgressModal,
}

impl Default for TaskPanel {
    fn default() -> Self {
        Self {
            process: TaskControl::new(TaskKind::Process),
            fetch: TaskControl::new(TaskKind::Fetch),
            modal: ProgressModal::default(),
        }
    }
}

impl TaskPanel {
    pub fn control(&self, kind: TaskKind) -> &TaskControl {
        match kind {
            TaskKind::Process => &self.process,
            TaskKind::Fetch => &self.fetch,
        }
    }

    pub fn control_mut(&mut self, kind: TaskKind) -> &mut TaskControl {
        match kind {
            TaskKind::Process => &mut self.process,
            TaskKind::Fetch => &mut self.fetch,
        }
    }

    /// True while any trigger is disabled.
    pub fn any_busy(&self) -> bool {
        self.process.busy || self.fetch.busy
    }

    /// Whether `kind` may write to the modal. A closed modal, or one left
    /// behind by a finished task, is taken over; a running owner keeps it.
    fn claim(&mut self, kind: TaskKind) -> bool {
        let current = self.modal.owner;
        match current {
            Some(owner) if owner == kind => true,
            Some(owner) if self.modal.open && self.control(owner).busy => false,
            _ => {
                self.modal = ProgressModal::opened_for(kind);
                true
            }
        }
    }
}

/// [`TaskReporter`] that renders into a shared [`TaskPanel`].
#[derive(Debug, Clone, Default)]
pub struct SharedTaskPanel(Arc<Mutex<TaskPanel>>);

impl SharedTaskPanel {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TaskPanel> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> TaskPanel {
        self.lock().clone()
    }
}

impl TaskReporter for SharedTaskPanel {
    fn begin(&self, kind: TaskKind) -> Result<()> {
        let mut panel = self.lock();
        let control = panel.control_mut(kind);
        if control.busy {
            return Err(Error::Busy(kind.title().to_string()));
        }
        control.busy = true;
        control.label = kind.busy_label().to_string();
        if panel.modal.owner == Some(kind) {
            panel.modal = ProgressModal::opened_for(kind);
        } else {
            panel.claim(kind);
        }
        Ok(())
    }

    fn progress(&self, kind: TaskKind, pct: u8, message: &str) {
        let mut panel = self.lock();
        if panel.claim(kind) {
            panel.modal.pct = pct.min(100);
            panel.modal.message = message.to_string();
        }
    }

    fn complete(&self, kind: TaskKind, message: &str) {
        let mut panel = self.lock();
        if panel.claim(kind) {
            panel.modal.striped = false;
            panel.modal.cancellable = false;
            panel.modal.message = message.to_string();
        }
    }

    fn fail(&self, kind: TaskKind, message: &str) {
        let mut panel = self.lock();
        if panel.claim(kind) {
            panel.modal.striped = false;
            panel.modal.error = true;
            panel.modal.cancellable = false;
            panel.modal.message = message.to_string();
        }
    }

    fn restore(&self, kind: TaskKind) {
        let mut panel = self.lock();
        let control = panel.control_mut(kind);
        control.busy = false;
        control.label = kind.idle_label().to_string();
    }

    fn dismiss(&self, kind: TaskKind) {
        let mut panel = self.lock();
        if panel.modal.owner == Some(kind) {
            panel.modal = ProgressModal::default();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkSummary {
    pub progress: TaskProgress,
    pub batches: u64,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSummary {
    Processed(BulkSummary),
    Fetched(FetchOutcome),
}

pub struct TaskRunner {
    api: Arc<dyn NewsApi>,
    config: DashboardConfig,
    reporter: Arc<dyn TaskReporter>,
}

impl TaskRunner {
    pub fn new(api: Arc<dyn NewsApi>, config: DashboardConfig, reporter: Arc<dyn TaskReporter>) -> Self {
        Self { api, config, reporter }
    }

    pub fn reporter(&self) -> &Arc<dyn TaskReporter> {
        &self.reporter
    }

    pub async fn run(&self, kind: TaskKind, cancel: &CancelHandle) -> Result<TaskSummary> {
        self.reporter.begin(kind)?;
        self.run_started(kind, cancel).await
    }

    /// Run `kind` once its trigger has been claimed with [`TaskReporter::begin`].
    pub async fn run_started(&self, kind: TaskKind, cancel: &CancelHandle) -> Result<TaskSummary> {
        match kind {
            TaskKind::Process => self.finish_process(cancel).await.map(TaskSummary::Processed),
            TaskKind::Fetch => self.finish_fetch().await.map(TaskSummary::Fetched),
        }
    }

    /// Process every unprocessed article, one batch at a time.
    pub async fn process_unprocessed(&self, cancel: &CancelHandle) -> Result<BulkSummary> {
        self.reporter.begin(TaskKind::Process)?;
        self.finish_process(cancel).await
    }

    async fn finish_process(&self, cancel: &CancelHandle) -> Result<BulkSummary> {
        let mut machine = BulkProcess::from_config(&self.config);
        let result = self.drive(&mut machine, cancel).await;
        match &result {
            Ok(summary) if summary.cancelled => {
                warn!("🛑 Bulk processing cancelled after {} articles", summary.progress.processed_sum);
                self.reporter.complete(TaskKind::Process, &format!(
                    "已取消，已处理 {}/{} 篇",
                    summary.progress.processed_sum, summary.progress.total_unprocessed
                ));
            }
            Ok(summary) => {
                info!(
                    "✅ Bulk processing finished: {}/{} articles in {} batches",
                    summary.progress.processed_sum, summary.progress.total_unprocessed, summary.batches
                );
                let message = if summary.progress.total_unprocessed == 0 {
                    "没有需要处理的文章".to_string()
                } else {
                    format!("处理完成，共处理 {} 篇文章", summary.progress.processed_sum)
                };
                self.reporter.complete(TaskKind::Process, &message);
            }
            Err(e) => {
                error!("❌ Bulk processing failed: {}", e);
                self.reporter.fail(TaskKind::Process, &format!("处理失败: {}", e));
            }
        }
        self.reporter.restore(TaskKind::Process);
        result
    }

    async fn drive(&self, machine: &mut BulkProcess, cancel: &CancelHandle) -> Result<BulkSummary> {
        machine.start();
        self.reporter.progress(TaskKind::Process, 0, "正在统计未处理文章...");
        let total = match self.api.stats().await {
            Ok(stats) => stats.unprocessed_articles,
            Err(e) => {
                machine.on_error(e.to_string());
                return Err(e);
            }
        };
        machine.on_total(total);
        info!("🧠 {} unprocessed articles, at most {} batches", total, machine.cap());

        while let Some(request) = machine.next_request() {
            if cancel.is_cancelled() {
                machine.cancel();
                break;
            }
            let outcome = match self.api.process_unprocessed(&request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    machine.on_error(e.to_string());
                    return Err(e);
                }
            };
            machine.on_batch(outcome.processed);
            let progress = machine.progress();
            self.reporter.progress(
                TaskKind::Process,
                progress.pct,
                &format!("已处理 {}/{} 篇", progress.processed_sum, progress.total_unprocessed),
            );
        }

        let batches = match machine.state() {
            BulkState::Done { iterations, .. } => *iterations,
            _ => 0,
        };
        let progress = machine.progress();
        if progress.total_unprocessed == 0 {
            self.reporter.progress(TaskKind::Process, 100, "没有需要处理的文章");
        }
        Ok(BulkSummary {
            progress,
            batches,
            cancelled: matches!(machine.state(), BulkState::Cancelled { .. }),
        })
    }

    /// One fetch request; the bar only jumps from 25% to 100%.
    pub async fn fetch_latest(&self) -> Result<FetchOutcome> {
        self.reporter.begin(TaskKind::Fetch)?;
        self.finish_fetch().await
    }

    async fn finish_fetch(&self) -> Result<FetchOutcome> {
        self.reporter.progress(TaskKind::Fetch, 25, "正在抓取最新文章...");
        let result = self.api.fetch_latest().await;
        match &result {
            Ok(outcome) => {
                info!(
                    "📰 Fetch finished: {} articles, {} unprocessed",
                    outcome.total_articles, outcome.unprocessed_articles
                );
                self.reporter.progress(TaskKind::Fetch, 100, "抓取完成");
                self.reporter.complete(TaskKind::Fetch, &format!(
                    "抓取完成，共 {} 篇文章，未处理 {} 篇",
                    outcome.total_articles, outcome.unprocessed_articles
                ));
            }
            Err(e) => {
                error!("❌ Fetch failed: {}", e);
                self.reporter.fail(TaskKind::Fetch, &format!("抓取失败: {}", e));
            }
        }
        self.reporter.restore(TaskKind::Fetch);
        result
    }

    /// Close `kind`'s modal after the configured delay.
    pub async fn dismiss_later(&self, kind: TaskKind) {
        tokio::time::sleep(self.config.dismiss_delay).await;
        self.reporter.dismiss(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_client::{MemoryNewsApi, Operation};
    use nd_core::Article;
    use std::time::Duration;

    fn unprocessed(count: usize) -> Vec<Article> {
        (0..count)
            .map(|i| Article {
                id: format!("a{}", i),
                ..Default::default()
            })
            .collect()
    }

    fn runner(api: &MemoryNewsApi, panel: &SharedTaskPanel) -> TaskRunner {
        let config = DashboardConfig {
            dismiss_delay: Duration::from_millis(10),
            ..Default::default()
        };
        TaskRunner::new(Arc::new(api.clone()), config, Arc::new(panel.clone()))
    }

    #[test]
    fn test_percent_and_cap() {
        assert_eq!(percent(0, 25), 0);
        assert_eq!(percent(10, 25), 40);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(30, 25), 100);
        assert_eq!(percent(0, 0), 100);
        assert_eq!(iteration_cap(25, 10, 5), 8);
        assert_eq!(iteration_cap(30, 10, 5), 8);
        assert_eq!(iteration_cap(1, 10, 5), 6);
    }

    #[test]
    fn test_machine_runs_to_total() {
        let mut machine = BulkProcess::new(10, 0, 5);
        assert!(machine.next_request().is_none());
        machine.start();
        machine.on_total(25);
        assert_eq!(machine.cap(), 8);
        for batch in [10, 10, 5] {
            assert!(machine.next_request().is_some());
            machine.on_batch(batch);
        }
        assert_eq!(machine.state(), &BulkState::Done { processed: 25, total: 25, iterations: 3 });
        assert!(machine.next_request().is_none());
        assert_eq!(machine.progress().pct, 100);
    }

    #[test]
    fn test_machine_stops_on_empty_batch() {
        let mut machine = BulkProcess::new(10, 0, 5);
        machine.start();
        machine.on_total(25);
        machine.on_batch(10);
        machine.on_batch(0);
        assert_eq!(machine.state(), &BulkState::Done { processed: 10, total: 25, iterations: 2 });
        assert_eq!(machine.progress().pct, 40);
    }

    #[test]
    fn test_machine_respects_iteration_cap() {
        let mut machine = BulkProcess::new(10, 0, 5);
        machine.start();
        machine.on_total(25);
        let mut sent = 0;
        while machine.next_request().is_some() {
            machine.on_batch(1);
            sent += 1;
        }
        assert_eq!(sent, 8);
        assert_eq!(machine.state(), &BulkState::Done { processed: 8, total: 25, iterations: 8 });
    }

    #[test]
    fn test_machine_terminal_states_stick() {
        let mut machine = BulkProcess::new(10, 0, 5);
        machine.start();
        machine.on_total(25);
        machine.on_batch(10);
        machine.on_error("boom");
        assert_eq!(
            machine.state(),
            &BulkState::Failed { processed: 10, total: 25, error: "boom".to_string() }
        );
        machine.cancel();
        machine.on_batch(10);
        assert!(matches!(machine.state(), BulkState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_bulk_run_three_batches() {
        let api = MemoryNewsApi::with_articles(unprocessed(25));
        api.script_batches([10, 10, 5]).await;
        let panel = SharedTaskPanel::new();
        let runner = runner(&api, &panel);

        let summary = runner.process_unprocessed(&CancelHandle::new()).await.unwrap();
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.progress.processed_sum, 25);
        assert_eq!(summary.progress.pct, 100);
        assert!(!summary.cancelled);
        assert_eq!(api.calls(Operation::Process).await, 3);

        let state = panel.snapshot();
        assert!(state.modal.open);
        assert_eq!(state.modal.pct, 100);
        assert!(!state.modal.striped);
        assert!(!state.modal.error);
        assert!(!state.process.busy);
        assert_eq!(state.process.label, "批量AI处理");

        runner.dismiss_later(TaskKind::Process).await;
        assert!(!panel.snapshot().modal.open);
    }

    #[tokio::test]
    async fn test_bulk_run_stops_when_server_is_exhausted() {
        let api = MemoryNewsApi::with_articles(unprocessed(25));
        api.script_batches([10, 0, 10]).await;
        let panel = SharedTaskPanel::new();
        let summary = runner(&api, &panel)
            .process_unprocessed(&CancelHandle::new())
            .await
            .unwrap();
        assert_eq!(summary.batches, 2);
        assert_eq!(summary.progress.processed_sum, 10);
        assert_eq!(api.calls(Operation::Process).await, 2);
    }

    #[tokio::test]
    async fn test_bulk_run_nothing_to_do() {
        let api = MemoryNewsApi::new();
        let panel = SharedTaskPanel::new();
        let summary = runner(&api, &panel)
            .process_unprocessed(&CancelHandle::new())
            .await
            .unwrap();
        assert_eq!(summary.batches, 0);
        assert_eq!(api.calls(Operation::Process).await, 0);
        assert_eq!(panel.snapshot().modal.message, "没有需要处理的文章");
    }

    #[tokio::test]
    async fn test_bulk_run_failed_batch_aborts() {
        let api = MemoryNewsApi::with_articles(unprocessed(25));
        api.fail(Operation::Process, "model offline").await;
        let panel = SharedTaskPanel::new();
        let err = runner(&api, &panel)
            .process_unprocessed(&CancelHandle::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model offline"));
        assert_eq!(api.calls(Operation::Process).await, 1);

        let state = panel.snapshot();
        assert!(state.modal.error);
        assert!(state.modal.message.starts_with("处理失败"));
        assert!(!state.process.busy);
    }

    #[tokio::test]
    async fn test_bulk_run_cancelled_before_first_batch() {
        let api = MemoryNewsApi::with_articles(unprocessed(25));
        let panel = SharedTaskPanel::new();
        let cancel = CancelHandle::new();
        cancel.cancel();
        let summary = runner(&api, &panel).process_unprocessed(&cancel).await.unwrap();
        assert!(summary.cancelled);
        assert_eq!(api.calls(Operation::Process).await, 0);
        assert!(!panel.snapshot().process.busy);
    }

    #[tokio::test]
    async fn test_busy_control_rejects_second_run() {
        let panel = SharedTaskPanel::new();
        panel.begin(TaskKind::Fetch).unwrap();
        let api = MemoryNewsApi::new();
        let err = runner(&api, &panel).fetch_latest().await.unwrap_err();
        assert!(matches!(err, Error::Busy(_)));
        assert_eq!(api.calls(Operation::Fetch).await, 0);
        // the running task still owns the control
        assert!(panel.snapshot().fetch.busy);
    }

    #[tokio::test]
    async fn test_overlapping_runs_keep_modal_with_first_owner() {
        let panel = SharedTaskPanel::new();
        panel.begin(TaskKind::Fetch).unwrap();
        panel.progress(TaskKind::Fetch, 25, "正在抓取最新文章...");

        let api = MemoryNewsApi::with_articles(unprocessed(5));
        let runner = runner(&api, &panel);
        let summary = runner.process_unprocessed(&CancelHandle::new()).await.unwrap();
        assert_eq!(summary.progress.processed_sum, 5);

        let state = panel.snapshot();
        assert_eq!(state.modal.owner, Some(TaskKind::Fetch));
        assert_eq!(state.modal.title, "抓取最新文章");
        assert_eq!(state.modal.message, "正在抓取最新文章...");
        assert_eq!(state.modal.pct, 25);
        assert!(!state.process.busy);

        runner.dismiss_later(TaskKind::Process).await;
        let state = panel.snapshot();
        assert!(state.fetch.busy);
        assert!(state.modal.open);

        panel.complete(TaskKind::Fetch, "抓取完成");
        panel.restore(TaskKind::Fetch);
        panel.dismiss(TaskKind::Fetch);
        assert!(!panel.snapshot().modal.open);
    }

    #[test]
    fn test_running_task_takes_over_modal_after_owner_finishes() {
        let panel = SharedTaskPanel::new();
        panel.begin(TaskKind::Process).unwrap();
        panel.begin(TaskKind::Fetch).unwrap();
        assert_eq!(panel.snapshot().modal.owner, Some(TaskKind::Process));

        panel.complete(TaskKind::Process, "处理完成");
        panel.restore(TaskKind::Process);
        panel.progress(TaskKind::Fetch, 25, "正在抓取最新文章...");
        let state = panel.snapshot();
        assert_eq!(state.modal.owner, Some(TaskKind::Fetch));
        assert_eq!(state.modal.title, "抓取最新文章");
        assert_eq!(state.modal.pct, 25);

        // a late dismiss from the previous owner
        panel.dismiss(TaskKind::Process);
        assert!(panel.snapshot().modal.open);
    }

    #[tokio::test]
    async fn test_fetch_reports_totals() {
        let api = MemoryNewsApi::new();
        api.queue_incoming(unprocessed(3)).await;
        let panel = SharedTaskPanel::new();
        let outcome = runner(&api, &panel).fetch_latest().await.unwrap();
        assert_eq!(outcome.total_articles, 3);
        let state = panel.snapshot();
        assert_eq!(state.modal.pct, 100);
        assert_eq!(state.modal.message, "抓取完成，共 3 篇文章，未处理 3 篇");
        assert!(!state.fetch.busy);
        assert_eq!(state.fetch.label, "抓取最新文章");
    }

    #[tokio::test]
    async fn test_fetch_failure_marks_bar() {
        let api = MemoryNewsApi::new();
        api.fail(Operation::Fetch, "rss down").await;
        let panel = SharedTaskPanel::new();
        assert!(runner(&api, &panel).fetch_latest().await.is_err());
        let state = panel.snapshot();
        assert!(state.modal.error);
        assert_eq!(state.modal.pct, 25);
        assert!(!state.fetch.busy);
    }
}
