//! Source Provider Port - 源站适配器
//!
//! 抓取并解析源站页面由外部服务完成，这里只定义调用契约

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::novel::{ChapterKey, NovelKey, TocEntry};

/// 源站抓取错误
#[derive(Debug, Error)]
pub enum SourceFetchError {
    #[error("Not found on provider: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

/// 源站返回的元数据
#[derive(Debug, Clone)]
pub struct RemoteNovelMetadata {
    pub title: String,
    pub introduction: String,
    pub toc: Vec<TocEntry>,
}

/// 源站返回的章节
#[derive(Debug, Clone)]
pub struct RemoteChapter {
    pub paragraphs: Vec<String>,
}

/// Source Provider Port
#[async_trait]
pub trait SourceProviderPort: Send + Sync {
    /// 抓取目录与元数据
    async fn fetch_metadata(&self, key: &NovelKey) -> Result<RemoteNovelMetadata, SourceFetchError>;

    /// 抓取章节正文
    async fn fetch_chapter(&self, key: &ChapterKey) -> Result<RemoteChapter, SourceFetchError>;
}
