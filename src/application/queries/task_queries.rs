//! Task Queries

/// 查询批量任务
#[derive(Debug, Clone)]
pub struct GetTask {
    pub task_id: String,
}

/// 获取批量任务中某条文本的音频
#[derive(Debug, Clone)]
pub struct GetTaskAudio {
    pub task_id: String,
    pub index: usize,
}
