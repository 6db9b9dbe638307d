//! Run Manager Port - 翻译任务管理
//!
//! 定义后台翻译任务的登记与计数接口，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::orchestrator::{RunOutcome, TranslateRunRequest};

/// Run Manager 错误
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Run not found: {0}")]
    NotFound(String),

    #[error("Run queue is full")]
    QueueFull,
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// 排队中
    Queued,
    /// 执行中
    Running,
    /// 正常结束
    Completed,
    /// 因 Abort 提前结束
    Aborted,
    /// 未能开始（规划或构造翻译器失败）
    NotStarted,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Queued => "queued",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Aborted => "aborted",
            RunState::NotStarted => "not_started",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Aborted | RunState::NotStarted
        )
    }
}

impl From<RunOutcome> for RunState {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed => RunState::Completed,
            RunOutcome::Aborted => RunState::Aborted,
            RunOutcome::NotStarted => RunState::NotStarted,
        }
    }
}

/// 翻译任务
#[derive(Debug, Clone)]
pub struct TranslateRun {
    pub run_id: String,
    pub request: TranslateRunRequest,
    pub state: RunState,
    /// 待处理章节数，开始前为空
    pub total: Option<usize>,
    pub succeeded: usize,
    pub failed: usize,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TranslateRun {
    pub fn new(request: TranslateRunRequest) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            request,
            state: RunState::Queued,
            total: None,
            succeeded: 0,
            failed: 0,
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// Run Manager Port
///
/// 所有状态存储在内存中
pub trait RunManagerPort: Send + Sync {
    /// 登记任务并放入队列，返回 run_id
    fn submit(&self, request: TranslateRunRequest) -> Result<String, RunError>;

    /// 获取任务
    fn get(&self, run_id: &str) -> Option<TranslateRun>;

    /// 标记开始执行
    fn mark_running(&self, run_id: &str) -> Result<(), RunError>;

    /// 记录待处理章节数
    fn set_total(&self, run_id: &str, total: usize) -> Result<(), RunError>;

    /// 记录一个成功单元
    fn record_success(&self, run_id: &str) -> Result<(), RunError>;

    /// 记录一个失败单元
    fn record_failure(&self, run_id: &str) -> Result<(), RunError>;

    /// 标记结束
    fn finish(&self, run_id: &str, outcome: RunOutcome) -> Result<(), RunError>;

    /// 移除结束时间早于 now - 保留时长的任务，返回移除数量
    fn cleanup_finished(&self, now: DateTime<Utc>) -> usize;
}
