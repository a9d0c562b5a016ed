//! In-Memory Task Manager Implementation

use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{BatchTask, ItemState, TaskError, TaskManagerPort, TaskState};

/// 内存任务管理器
pub struct InMemoryTaskManager {
    /// task_id -> BatchTask
    tasks: DashMap<String, BatchTask>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<String>,
}

impl InMemoryTaskManager {
    pub fn new(queue_sender: mpsc::Sender<String>) -> Self {
        Self {
            tasks: DashMap::new(),
            queue_sender,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskManagerPort for InMemoryTaskManager {
    fn submit(&self, task: BatchTask) -> Result<String, TaskError> {
        let task_id = task.task_id.clone();
        if self.tasks.contains_key(&task_id) {
            return Err(TaskError::AlreadyExists(task_id));
        }

        let item_count = task.items.len();
        self.tasks.insert(task_id.clone(), task);

        // 队列满时撤回任务，避免留下永远 pending 的记录
        if let Err(e) = self.queue_sender.try_send(task_id.clone()) {
            tracing::warn!(task_id = %task_id, error = %e, "Failed to enqueue task");
            self.tasks.remove(&task_id);
            return Err(TaskError::QueueFull);
        }

        tracing::debug!(task_id = %task_id, items = item_count, "Batch task submitted");
        Ok(task_id)
    }

    fn get_task(&self, task_id: &str) -> Option<BatchTask> {
        self.tasks.get(task_id).map(|t| t.clone())
    }

    fn set_state(&self, task_id: &str, state: TaskState) -> Result<(), TaskError> {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;

        let old_state = task.state;
        task.state = state;

        if state.is_finished() {
            task.completed_at = Some(Utc::now());
        }

        tracing::debug!(
            task_id = %task_id,
            old_state = ?old_state,
            new_state = ?state,
            "Task state changed"
        );
        Ok(())
    }

    fn record_item(
        &self,
        task_id: &str,
        index: usize,
        result: Result<Vec<u8>, String>,
    ) -> Result<(), TaskError> {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;

        let item = task
            .items
            .get_mut(index)
            .ok_or_else(|| TaskError::ItemNotFound {
                task_id: task_id.to_string(),
                index,
            })?;

        match result {
            Ok(audio) => {
                item.state = ItemState::Ready;
                item.audio = Some(Arc::new(audio));
                item.error = None;
            }
            Err(error) => {
                item.state = ItemState::Failed;
                item.audio = None;
                item.error = Some(error);
            }
        }
        Ok(())
    }

    fn purge_expired(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let before = self.tasks.len();
        self.tasks.retain(|_, task| task.created_at >= cutoff);
        let purged = before.saturating_sub(self.tasks.len());

        if purged > 0 {
            tracing::debug!(purged = purged, "Expired batch tasks purged");
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::Prosody;

    fn task(texts: &[&str]) -> BatchTask {
        BatchTask::new(
            "DeepSeek".to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
            Prosody::default(),
        )
    }

    #[tokio::test]
    async fn test_task_lifecycle() {
        let (tx, mut rx) = mpsc::channel(100);
        let manager = InMemoryTaskManager::new(tx);

        let task_id = manager.submit(task(&["one", "two"])).unwrap();

        // Check queue
        assert_eq!(rx.try_recv().unwrap(), task_id);
        assert_eq!(
            manager.get_task(&task_id).map(|t| t.state),
            Some(TaskState::Pending)
        );

        manager.set_state(&task_id, TaskState::Processing).unwrap();
        manager.record_item(&task_id, 0, Ok(vec![1, 2, 3])).unwrap();
        manager
            .record_item(&task_id, 1, Err("upstream down".to_string()))
            .unwrap();
        manager.set_state(&task_id, TaskState::Completed).unwrap();

        let stored = manager.get_task(&task_id).unwrap();
        assert_eq!(stored.state, TaskState::Completed);
        assert!(stored.completed_at.is_some());
        assert_eq!(stored.ready_count(), 1);
        assert_eq!(stored.items[0].audio.as_deref(), Some(&vec![1, 2, 3]));
        assert_eq!(stored.items[1].state, ItemState::Failed);
        assert_eq!(stored.items[1].error.as_deref(), Some("upstream down"));
    }

    #[tokio::test]
    async fn test_record_unknown_item() {
        let (tx, _rx) = mpsc::channel(100);
        let manager = InMemoryTaskManager::new(tx);
        let task_id = manager.submit(task(&["one"])).unwrap();

        let err = manager.record_item(&task_id, 5, Ok(vec![])).unwrap_err();
        assert!(matches!(err, TaskError::ItemNotFound { index: 5, .. }));

        let err = manager.set_state("missing", TaskState::Failed).unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_queue_full_rolls_back() {
        let (tx, _rx) = mpsc::channel(1);
        let manager = InMemoryTaskManager::new(tx);

        manager.submit(task(&["one"])).unwrap();
        let err = manager.submit(task(&["two"])).unwrap_err();
        assert!(matches!(err, TaskError::QueueFull));
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (tx, _rx) = mpsc::channel(100);
        let manager = InMemoryTaskManager::new(tx);

        let mut old = task(&["old"]);
        old.created_at = Utc::now() - Duration::hours(2);
        let old_id = manager.submit(old).unwrap();
        let fresh_id = manager.submit(task(&["fresh"])).unwrap();

        assert_eq!(manager.purge_expired(Duration::hours(1)), 1);
        assert!(manager.get_task(&old_id).is_none());
        assert!(manager.get_task(&fresh_id).is_some());
    }
}
