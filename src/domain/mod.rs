//! Domain Layer - 领域层
//!
//! Voice Context: 上游音色目录与合成参数

pub mod voice;
