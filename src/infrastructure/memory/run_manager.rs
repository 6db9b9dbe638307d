//! In-Memory Run Manager Implementation

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::orchestrator::{RunOutcome, TranslateRunRequest};
use crate::application::ports::{RunError, RunManagerPort, RunState, TranslateRun};

/// 已结束任务的默认保留时长（分钟）
pub const DEFAULT_RUN_RETENTION_MINUTES: i64 = 60;

/// 内存翻译任务管理器
///
/// 已结束的任务保留一段时间供查询，之后在提交新任务时清理
pub struct InMemoryRunManager {
    /// run_id -> TranslateRun
    runs: DashMap<String, TranslateRun>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<String>,
    retention: Duration,
}

impl InMemoryRunManager {
    pub fn new(queue_sender: mpsc::Sender<String>) -> Self {
        Self {
            runs: DashMap::new(),
            queue_sender,
            retention: Duration::minutes(DEFAULT_RUN_RETENTION_MINUTES),
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn update<F>(&self, run_id: &str, f: F) -> Result<(), RunError>
    where
        F: FnOnce(&mut TranslateRun),
    {
        let mut run = self
            .runs
            .get_mut(run_id)
            .ok_or_else(|| RunError::NotFound(run_id.to_string()))?;
        f(run.value_mut());
        Ok(())
    }
}

impl RunManagerPort for InMemoryRunManager {
    fn submit(&self, request: TranslateRunRequest) -> Result<String, RunError> {
        self.cleanup_finished(Utc::now());

        let run = TranslateRun::new(request);
        let run_id = run.run_id.clone();
        self.runs.insert(run_id.clone(), run);

        if let Err(e) = self.queue_sender.try_send(run_id.clone()) {
            tracing::warn!(run_id = %run_id, error = %e, "Failed to enqueue run");
            self.runs.remove(&run_id);
            return Err(RunError::QueueFull);
        }

        tracing::debug!(run_id = %run_id, "Run submitted");
        Ok(run_id)
    }

    fn get(&self, run_id: &str) -> Option<TranslateRun> {
        self.runs.get(run_id).map(|r| r.clone())
    }

    fn mark_running(&self, run_id: &str) -> Result<(), RunError> {
        self.update(run_id, |run| run.state = RunState::Running)
    }

    fn set_total(&self, run_id: &str, total: usize) -> Result<(), RunError> {
        self.update(run_id, |run| run.total = Some(total))
    }

    fn record_success(&self, run_id: &str) -> Result<(), RunError> {
        self.update(run_id, |run| run.succeeded += 1)
    }

    fn record_failure(&self, run_id: &str) -> Result<(), RunError> {
        self.update(run_id, |run| run.failed += 1)
    }

    fn finish(&self, run_id: &str, outcome: RunOutcome) -> Result<(), RunError> {
        self.update(run_id, |run| {
            let old_state = run.state;
            run.state = outcome.into();
            run.finished_at = Some(Utc::now());
            tracing::debug!(
                run_id = %run_id,
                old_state = ?old_state,
                new_state = ?run.state,
                "Run state changed"
            );
        })
    }

    fn cleanup_finished(&self, now: DateTime<Utc>) -> usize {
        let before = self.runs.len();
        let deadline = now - self.retention;
        self.runs
            .retain(|_, run| run.finished_at.map_or(true, |at| at > deadline));

        let removed = before.saturating_sub(self.runs.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.runs.len(), "Finished runs cleaned up");
        }
        removed
    }
}
