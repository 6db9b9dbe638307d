//! Translate Commands

use crate::domain::novel::{ChapterKey, Glossary, GlossaryVersion, MetadataTranslation, NovelKey};
use crate::domain::TranslatorId;

/// 上传元数据译文
#[derive(Debug, Clone)]
pub struct UpdateMetadataTranslation {
    pub novel: NovelKey,
    pub translator: TranslatorId,
    pub translation: MetadataTranslation,
}

/// 上传章节译文
#[derive(Debug, Clone)]
pub struct UpdateChapterTranslation {
    pub chapter: ChapterKey,
    pub translator: TranslatorId,
    /// 规划任务时拿到的术语表版本
    pub glossary_version: Option<GlossaryVersion>,
    pub paragraphs_zh: Vec<String>,
}

/// 编辑术语表
#[derive(Debug, Clone)]
pub struct UpdateGlossary {
    pub novel: NovelKey,
    pub glossary: Glossary,
}
