//! File Artifact Ports - 文件产物存储与渲染

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::chapter::Chapter;
use crate::domain::novel::Novel;
use crate::domain::{FileArtifactKey, FileLang, FileType};

/// 文件存储错误
#[derive(Debug, Error)]
pub enum FileArtifactError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// 已存在的文件产物
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub path: PathBuf,
    /// 生成时间
    pub produced_at: DateTime<Utc>,
}

/// File Artifact Storage Port
#[async_trait]
pub trait FileArtifactStoragePort: Send + Sync {
    /// 产物路径（无论是否存在）
    fn artifact_path(&self, key: &FileArtifactKey) -> PathBuf;

    /// 查询已存在的产物
    async fn stat(&self, key: &FileArtifactKey) -> Result<Option<StoredArtifact>, FileArtifactError>;

    /// 原子写入产物，读者只会看到完整的旧文件或新文件
    async fn write(
        &self,
        key: &FileArtifactKey,
        data: &[u8],
    ) -> Result<StoredArtifact, FileArtifactError>;
}

/// Novel File Renderer Port
pub trait NovelFileRendererPort: Send + Sync {
    /// 按目录顺序渲染，chapters 中缺失的章节会被跳过
    fn render(
        &self,
        novel: &Novel,
        chapters: &[Chapter],
        lang: FileLang,
        file_type: FileType,
    ) -> Result<Vec<u8>, RenderError>;
}
