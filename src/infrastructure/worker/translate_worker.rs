//! Translate Worker - Background Translate Run Processor

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::application::orchestrator::TranslateOrchestrator;
use crate::application::ports::{RunManagerPort, RunState};
use crate::infrastructure::events::{EventProgressSink, EventPublisher};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct TranslateWorkerConfig {
    /// 最大并发任务数（单个任务内部始终串行）
    pub max_concurrent: usize,
}

impl Default for TranslateWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

/// 翻译 Worker
///
/// 从队列消费 run_id 并执行翻译编排
pub struct TranslateWorker {
    config: TranslateWorkerConfig,
    queue_receiver: mpsc::Receiver<String>,
    run_manager: Arc<dyn RunManagerPort>,
    orchestrator: Arc<TranslateOrchestrator>,
    event_publisher: Arc<EventPublisher>,
}

impl TranslateWorker {
    pub fn new(
        config: TranslateWorkerConfig,
        queue_receiver: mpsc::Receiver<String>,
        run_manager: Arc<dyn RunManagerPort>,
        orchestrator: Arc<TranslateOrchestrator>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            run_manager,
            orchestrator,
            event_publisher,
        }
    }

    /// 启动 Worker，队列关闭后返回
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "TranslateWorker started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));

        while let Some(run_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to acquire semaphore permit");
                    continue;
                }
            };

            let run_manager = self.run_manager.clone();
            let orchestrator = self.orchestrator.clone();
            let event_publisher = self.event_publisher.clone();

            tokio::spawn(async move {
                let _permit = permit;
                Self::process_run(&run_id, run_manager, orchestrator, event_publisher).await;
            });
        }

        tracing::info!("TranslateWorker stopped");
    }

    /// 执行单个任务
    async fn process_run(
        run_id: &str,
        run_manager: Arc<dyn RunManagerPort>,
        orchestrator: Arc<TranslateOrchestrator>,
        event_publisher: Arc<EventPublisher>,
    ) {
        let run = match run_manager.get(run_id) {
            Some(run) => run,
            None => {
                tracing::warn!(run_id = %run_id, "Run not found, skipping");
                return;
            }
        };

        if let Err(e) = run_manager.mark_running(run_id) {
            tracing::error!(run_id = %run_id, error = %e, "Failed to update run state");
            return;
        }

        let sink = EventProgressSink::new(run_id, run_manager.clone(), event_publisher.clone());
        let summary = orchestrator.run(&run.request, &sink).await;

        if let Err(e) = run_manager.finish(run_id, summary.outcome) {
            tracing::error!(run_id = %run_id, error = %e, "Failed to finish run");
        }
        event_publisher.publish_run_finished(
            run_id,
            RunState::from(summary.outcome),
            summary.succeeded,
            summary.failed,
        );
        event_publisher.close(run_id);

        tracing::info!(
            run_id = %run_id,
            novel = %run.request.novel,
            translator = %run.request.translator,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            outcome = ?summary.outcome,
            "Run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::orchestrator::TranslateRunRequest;
    use crate::application::test_support::{FakeTranslatorFactory, Fixture};
    use crate::domain::TranslatorId;
    use crate::infrastructure::events::WsEvent;
    use crate::infrastructure::memory::InMemoryRunManager;

    struct Harness {
        fixture: Fixture,
        manager: Arc<InMemoryRunManager>,
        publisher: Arc<EventPublisher>,
    }

    async fn start(factory: FakeTranslatorFactory) -> Harness {
        let fixture = Fixture::new().await;
        let (tx, rx) = mpsc::channel(8);
        let manager = InMemoryRunManager::new(tx).arc();
        let publisher = EventPublisher::new().arc();
        let worker = TranslateWorker::new(
            TranslateWorkerConfig::default(),
            rx,
            manager.clone(),
            Arc::new(fixture.orchestrator(factory)),
            publisher.clone(),
        );
        tokio::spawn(worker.run());
        Harness {
            fixture,
            manager,
            publisher,
        }
    }

    fn request(fixture: &Fixture) -> TranslateRunRequest {
        TranslateRunRequest {
            novel: fixture.novel_key(),
            translator: TranslatorId::Baidu,
            access_token: None,
            start_index: 0,
            end_index: usize::MAX,
            translate_expired: false,
            sync_from_provider: false,
        }
    }

    async fn collect(mut rx: tokio::sync::broadcast::Receiver<WsEvent>) -> Vec<WsEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_worker_runs_and_publishes() {
        let harness = start(FakeTranslatorFactory::new()).await;
        let run_id = harness.manager.submit(request(&harness.fixture)).unwrap();
        let events = collect(harness.publisher.subscribe(&run_id)).await;

        // 单线程运行时下 submit 与 subscribe 之间不会让出，订阅不会错过事件
        assert!(events
            .iter()
            .any(|e| matches!(e, WsEvent::RunStarted { total: 3, .. })));
        let succeeded = events
            .iter()
            .filter(|e| matches!(e, WsEvent::ChapterSucceeded { .. }))
            .count();
        assert_eq!(succeeded, 3);
        assert!(events.iter().any(|e| matches!(e, WsEvent::RunLog { .. })));
        assert!(matches!(
            events.last(),
            Some(WsEvent::RunFinished {
                state: RunState::Completed,
                succeeded: 3,
                failed: 0,
                ..
            })
        ));

        let run = harness.manager.get(&run_id).unwrap();
        assert_eq!(run.state, RunState::Completed);
        assert_eq!(run.total, Some(3));
        assert_eq!(run.succeeded, 3);
    }

    #[tokio::test]
    async fn test_worker_reports_not_started() {
        let harness = start(FakeTranslatorFactory::new().failing_create()).await;
        let run_id = harness.manager.submit(request(&harness.fixture)).unwrap();
        let events = collect(harness.publisher.subscribe(&run_id)).await;

        assert!(matches!(
            events.last(),
            Some(WsEvent::RunFinished {
                state: RunState::NotStarted,
                ..
            })
        ));
        let run = harness.manager.get(&run_id).unwrap();
        assert_eq!(run.state, RunState::NotStarted);
        assert_eq!(run.total, None);
    }
}
