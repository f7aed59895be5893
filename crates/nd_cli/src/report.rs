use std::sync::Mutex;

use nd_core::{Error, Result};
use nd_dashboard::{TaskKind, TaskReporter};
use tracing::{error, info};

/// Task feedback as log lines, for terminal runs.
#[derive(Debug, Default)]
pub struct LogReporter {
    running: Mutex<Option<TaskKind>>,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskReporter for LogReporter {
    fn begin(&self, kind: TaskKind) -> Result<()> {
        let mut running = self.running.lock().unwrap_or_else(|p| p.into_inner());
        if *running == Some(kind) {
            return Err(Error::Busy(kind.title().to_string()));
        }
        *running = Some(kind);
        info!("⏳ {}", kind.title());
        Ok(())
    }

    fn progress(&self, _kind: TaskKind, pct: u8, message: &str) {
        info!("📊 [{:>3}%] {}", pct, message);
    }

    fn complete(&self, _kind: TaskKind, message: &str) {
        info!("✅ {}", message);
    }

    fn fail(&self, _kind: TaskKind, message: &str) {
        error!("❌ {}", message);
    }

    fn restore(&self, kind: TaskKind) {
        let mut running = self.running.lock().unwrap_or_else(|p| p.into_inner());
        if *running == Some(kind) {
            *running = None;
        }
    }

    fn dismiss(&self, _kind: TaskKind) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_overlapping_runs_of_one_kind() {
        let reporter = LogReporter::new();
        reporter.begin(TaskKind::Process).unwrap();
        assert!(matches!(reporter.begin(TaskKind::Process), Err(Error::Busy(_))));
        reporter.restore(TaskKind::Process);
        assert!(reporter.begin(TaskKind::Process).is_ok());
    }
}
