//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 小说元数据在 SQLite，章节文档在 Sled

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::chapter::{Chapter, ChapterTranslation, ChapterTranslationOutline};
use crate::domain::novel::{ChapterKey, Novel, NovelKey, VersionedGlossary};
use crate::domain::TranslatorId;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 写入基于的修订号已过期
    #[error("Revision conflict: {0}")]
    Conflict(String),
}

// ============================================================================
// Novel Repository
// ============================================================================

/// Novel Repository Port
#[async_trait]
pub trait NovelRepositoryPort: Send + Sync {
    /// 根据键查找小说
    async fn find(&self, key: &NovelKey) -> Result<Option<Novel>, RepositoryError>;

    /// 保存源站同步结果（插入或更新源数据、目录与时间戳，不覆盖术语表）
    ///
    /// revision 为 0 时插入，否则只在存储修订号未变时更新；返回新修订号。
    /// change_at 只前进不后退。
    async fn save(&self, novel: &Novel) -> Result<u64, RepositoryError>;

    /// 保存元数据译文（标题、简介、目录译文），修订号约束同 save
    async fn update_translated_metadata(&self, novel: &Novel) -> Result<u64, RepositoryError>;

    /// 替换术语表及其版本
    async fn update_glossary(
        &self,
        key: &NovelKey,
        glossary: &VersionedGlossary,
    ) -> Result<(), RepositoryError>;

    /// 推进 change_at（不会回退），小说未缓存时无操作
    async fn touch_change_at(
        &self,
        key: &NovelKey,
        change_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

// ============================================================================
// Chapter Repository
// ============================================================================

/// 段落计数（上传译文后返回给调用方渲染进度）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TranslationCounters {
    /// 已缓存的源段落总数
    pub jp: usize,
    /// 该翻译器已翻译的段落总数
    pub zh: usize,
}

/// 章节译文写入错误
#[derive(Debug, Error)]
pub enum ChapterWriteError {
    #[error("Chapter not found: {0}")]
    NotFound(String),

    #[error("Length mismatch: expected {expected} paragraphs, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Chapter Repository Port
///
/// 章节文档的唯一所有者
#[async_trait]
pub trait ChapterRepositoryPort: Send + Sync {
    /// 本地查找，不触发网络
    async fn find(&self, key: &ChapterKey) -> Result<Option<Chapter>, RepositoryError>;

    /// 写入源段落，保留已有译文
    async fn save_source(
        &self,
        key: &ChapterKey,
        paragraphs: Vec<String>,
    ) -> Result<Chapter, RepositoryError>;

    /// 原子写入某个翻译器的译文
    ///
    /// 段落数与源段落数不一致时返回 LengthMismatch，且不修改存储
    async fn update_translation(
        &self,
        key: &ChapterKey,
        translator: TranslatorId,
        translation: ChapterTranslation,
    ) -> Result<Chapter, ChapterWriteError>;

    /// 小说下所有已缓存章节的翻译概要
    async fn translation_outlines(
        &self,
        novel: &NovelKey,
        translator: TranslatorId,
    ) -> Result<Vec<ChapterTranslationOutline>, RepositoryError>;

    /// 小说的段落计数
    async fn paragraph_stats(
        &self,
        novel: &NovelKey,
        translator: TranslatorId,
    ) -> Result<TranslationCounters, RepositoryError>;
}
