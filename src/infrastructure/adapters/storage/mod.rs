//! 文件产物存储

mod file_storage;

pub use file_storage::FsFileArtifactStorage;
