//! Model Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::VoiceCatalogPort;
use crate::application::queries::ListModels;

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ModelList {
    /// 目录刷新时间（Unix 秒），目录为空时为 0
    pub created: i64,
    pub models: Vec<ModelInfo>,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListModels Handler
pub struct ListModelsHandler {
    catalog: Arc<dyn VoiceCatalogPort>,
}

impl ListModelsHandler {
    pub fn new(catalog: Arc<dyn VoiceCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, _query: ListModels) -> Result<ModelList, ApplicationError> {
        let snapshot = self.catalog.get_models().await;

        let models: Vec<ModelInfo> = snapshot
            .models()
            .into_iter()
            .map(|(id, description)| ModelInfo { id, description })
            .collect();

        tracing::info!(count = models.len(), source = snapshot.source().as_str(), "Listing models");

        Ok(ModelList {
            created: snapshot.refreshed_at().map(|t| t.timestamp()).unwrap_or(0),
            models,
        })
    }
}
