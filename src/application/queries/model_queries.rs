//! Model Queries

/// 列出可用音色
#[derive(Debug, Clone)]
pub struct ListModels;
