//! 把编排进度回调转成任务计数与 WebSocket 事件

use std::sync::Arc;

use super::EventPublisher;
use crate::application::orchestrator::ProgressSink;
use crate::application::ports::{RunManagerPort, TranslationCounters};

pub struct EventProgressSink {
    run_id: String,
    run_manager: Arc<dyn RunManagerPort>,
    publisher: Arc<EventPublisher>,
}

impl EventProgressSink {
    pub fn new(
        run_id: impl Into<String>,
        run_manager: Arc<dyn RunManagerPort>,
        publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            run_manager,
            publisher,
        }
    }
}

impl ProgressSink for EventProgressSink {
    fn on_start(&self, total: usize) {
        if let Err(e) = self.run_manager.set_total(&self.run_id, total) {
            tracing::warn!(run_id = %self.run_id, error = %e, "Failed to record run total");
        }
        self.publisher.publish_run_started(&self.run_id, total);
    }

    fn on_chapter_success(&self, counters: Option<TranslationCounters>) {
        if let Err(e) = self.run_manager.record_success(&self.run_id) {
            tracing::warn!(run_id = %self.run_id, error = %e, "Failed to record success");
        }
        self.publisher.publish_chapter_succeeded(&self.run_id, counters);
    }

    fn on_chapter_failure(&self) {
        if let Err(e) = self.run_manager.record_failure(&self.run_id) {
            tracing::warn!(run_id = %self.run_id, error = %e, "Failed to record failure");
        }
        self.publisher.publish_chapter_failed(&self.run_id);
    }

    fn log(&self, message: &str) {
        self.publisher.publish_log(&self.run_id, message);
    }
}
