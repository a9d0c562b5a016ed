//! File Persistence - 文件系统存储实现

mod catalog_mirror;

pub use catalog_mirror::{FileCatalogMirror, MIRROR_FILE_NAME};
