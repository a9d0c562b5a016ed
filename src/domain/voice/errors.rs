//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("音色列表格式不正确: {0}")]
    Malformed(String),
}
