//! Persistence Layer - 数据持久化
//!
//! 只有音色目录的磁盘镜像需要落盘

pub mod file;

pub use self::file::FileCatalogMirror;
