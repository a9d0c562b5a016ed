//! Batch Worker - Background Batch Synthesis Processor

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::application::ports::{TaskManagerPort, TaskState};
use crate::application::CreateSpeechHandler;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct BatchWorkerConfig {
    /// 最大并发任务数
    pub max_concurrent: usize,
}

impl Default for BatchWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

/// 批量合成 Worker
///
/// 从队列消费任务 ID，任务内的文本逐条经过合成门面
pub struct BatchWorker {
    config: BatchWorkerConfig,
    queue_receiver: mpsc::Receiver<String>,
    task_manager: Arc<dyn TaskManagerPort>,
    speech: Arc<CreateSpeechHandler>,
}

impl BatchWorker {
    pub fn new(
        config: BatchWorkerConfig,
        queue_receiver: mpsc::Receiver<String>,
        task_manager: Arc<dyn TaskManagerPort>,
        speech: Arc<CreateSpeechHandler>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            task_manager,
            speech,
        }
    }

    /// 启动 Worker，队列关闭后返回
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "BatchWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));

        while let Some(task_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Failed to acquire semaphore permit");
                    break;
                }
            };

            let task_manager = self.task_manager.clone();
            let speech = self.speech.clone();

            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成
                Self::process_task(&task_id, task_manager, speech).await;
            });
        }

        tracing::info!("BatchWorker stopped");
    }

    /// 处理单个任务
    async fn process_task(
        task_id: &str,
        task_manager: Arc<dyn TaskManagerPort>,
        speech: Arc<CreateSpeechHandler>,
    ) {
        let task = match task_manager.get_task(task_id) {
            Some(t) => t,
            None => {
                tracing::warn!(task_id = %task_id, "Task not found, skipping");
                return;
            }
        };

        if let Err(e) = task_manager.set_state(task_id, TaskState::Processing) {
            tracing::error!(task_id = %task_id, error = %e, "Failed to update task state");
            return;
        }

        let mut ready = 0usize;
        for (index, item) in task.items.iter().enumerate() {
            let result = speech
                .get_audio(&item.text, &task.voice_tag, task.prosody)
                .await
                .map_err(|e| e.to_string());

            match &result {
                Ok(audio) => {
                    ready += 1;
                    tracing::debug!(task_id = %task_id, index = index, size = audio.len(), "Batch item ready");
                }
                Err(e) => {
                    tracing::warn!(task_id = %task_id, index = index, error = %e, "Batch item failed");
                }
            }

            if let Err(e) = task_manager.record_item(task_id, index, result) {
                // 任务可能已被清理
                tracing::warn!(task_id = %task_id, error = %e, "Failed to record batch item");
                return;
            }
        }

        let final_state = if ready > 0 {
            TaskState::Completed
        } else {
            TaskState::Failed
        };
        if let Err(e) = task_manager.set_state(task_id, final_state) {
            tracing::error!(task_id = %task_id, error = %e, "Failed to update task state");
            return;
        }

        tracing::info!(
            task_id = %task_id,
            ready = ready,
            total = task.items.len(),
            state = final_state.as_str(),
            "Batch task finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{BatchTask, ItemState, UpstreamPort, VoiceCatalogPort};
    use crate::domain::voice::Prosody;
    use crate::infrastructure::adapters::FakeUpstreamClient;
    use crate::infrastructure::memory::{InMemoryTaskManager, TtlVoiceCatalog};
    use std::time::Duration;

    async fn wait_finished(manager: &InMemoryTaskManager, task_id: &str) -> BatchTask {
        for _ in 0..200 {
            if let Some(task) = manager.get_task(task_id) {
                if task.state.is_finished() {
                    return task;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} did not finish", task_id);
    }

    fn setup(upstream: Arc<FakeUpstreamClient>) -> (Arc<InMemoryTaskManager>, BatchWorker) {
        let (tx, rx) = mpsc::channel(10);
        let manager = InMemoryTaskManager::new(tx).arc();
        let upstream: Arc<dyn UpstreamPort> = upstream;
        let catalog: Arc<dyn VoiceCatalogPort> =
            Arc::new(TtlVoiceCatalog::new(upstream.clone(), chrono::Duration::hours(2)));
        let speech = Arc::new(CreateSpeechHandler::new(catalog, upstream));
        let worker = BatchWorker::new(BatchWorkerConfig::default(), rx, manager.clone(), speech);
        (manager, worker)
    }

    #[tokio::test]
    async fn test_batch_completes_with_partial_failures() {
        let upstream = Arc::new(FakeUpstreamClient::with_defaults());
        let (manager, worker) = setup(upstream.clone());
        tokio::spawn(worker.run());

        let task = BatchTask::new(
            "DeepSeek".to_string(),
            vec!["first".to_string(), "   ".to_string()],
            Prosody::default(),
        );
        let task_id = manager.submit(task).unwrap();

        let task = wait_finished(&manager, &task_id).await;
        assert_eq!(task.state, TaskState::Completed);
        assert_eq!(task.items[0].state, ItemState::Ready);
        assert_eq!(task.items[1].state, ItemState::Failed);
        assert_eq!(upstream.synth_calls(), 1);
    }

    #[tokio::test]
    async fn test_batch_fails_when_every_item_fails() {
        let upstream = Arc::new(FakeUpstreamClient::with_defaults());
        let (manager, worker) = setup(upstream.clone());
        tokio::spawn(worker.run());

        // 上游不可用：目录退回默认音色，合成同样失败
        let task = BatchTask::new(
            "Kimi".to_string(),
            vec!["a".to_string(), "b".to_string()],
            Prosody::new(1.1, 1.2),
        );
        upstream.set_failing(true);
        let task_id = manager.submit(task).unwrap();

        let task = wait_finished(&manager, &task_id).await;
        assert_eq!(task.state, TaskState::Failed);
        assert!(task.items.iter().all(|item| item.error.is_some()));
    }
}
