//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现，每个翻译任务一个广播通道

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::{RunState, TranslationCounters};

/// WebSocket 事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 任务开始，total 为待处理单元数
    RunStarted { run_id: String, total: usize },
    /// 人类可读日志
    RunLog { run_id: String, message: String },
    /// 单元成功
    ChapterSucceeded {
        run_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        jp: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        zh: Option<usize>,
    },
    /// 单元失败（跳过）
    ChapterFailed { run_id: String },
    /// 任务结束
    RunFinished {
        run_id: String,
        state: RunState,
        succeeded: usize,
        failed: usize,
    },
}

/// 事件发布器
pub struct EventPublisher {
    /// run_id -> broadcast sender
    run_channels: DashMap<String, broadcast::Sender<WsEvent>>,
    capacity: usize,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            run_channels: DashMap::new(),
            capacity,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅任务事件，通道不存在时创建
    pub fn subscribe(&self, run_id: &str) -> broadcast::Receiver<WsEvent> {
        self.run_channels
            .entry(run_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// 移除任务通道，已有接收端在缓冲事件读完后收到 Closed
    pub fn close(&self, run_id: &str) {
        self.run_channels.remove(run_id);
    }

    pub fn publish_run_started(&self, run_id: &str, total: usize) {
        self.publish(
            run_id,
            WsEvent::RunStarted {
                run_id: run_id.to_string(),
                total,
            },
        );
    }

    pub fn publish_log(&self, run_id: &str, message: &str) {
        self.publish(
            run_id,
            WsEvent::RunLog {
                run_id: run_id.to_string(),
                message: message.to_string(),
            },
        );
    }

    pub fn publish_chapter_succeeded(&self, run_id: &str, counters: Option<TranslationCounters>) {
        self.publish(
            run_id,
            WsEvent::ChapterSucceeded {
                run_id: run_id.to_string(),
                jp: counters.map(|c| c.jp),
                zh: counters.map(|c| c.zh),
            },
        );
    }

    pub fn publish_chapter_failed(&self, run_id: &str) {
        self.publish(
            run_id,
            WsEvent::ChapterFailed {
                run_id: run_id.to_string(),
            },
        );
    }

    pub fn publish_run_finished(&self, run_id: &str, state: RunState, succeeded: usize, failed: usize) {
        self.publish(
            run_id,
            WsEvent::RunFinished {
                run_id: run_id.to_string(),
                state,
                succeeded,
                failed,
            },
        );
    }

    /// 发布事件到指定任务
    fn publish(&self, run_id: &str, event: WsEvent) {
        if let Some(sender) = self.run_channels.get(run_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    run_id = %run_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
