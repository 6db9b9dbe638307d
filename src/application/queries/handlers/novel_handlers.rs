//! Novel Query Handlers

use chrono::Duration;
use std::sync::Arc;

use crate::application::cache::{ChapterCache, NovelCache};
use crate::application::error::ApplicationError;
use crate::application::ports::ChapterRepositoryPort;
use crate::application::queries::{GetChapter, GetNovel};
use crate::domain::novel::Novel;
use crate::domain::TranslatorId;

// ============================================================================
// GetNovel
// ============================================================================

/// 小说详情
#[derive(Debug, Clone)]
pub struct NovelDetail {
    pub novel: Novel,
    /// 已缓存的源段落数
    pub jp: usize,
    /// 各翻译器已翻译的段落数
    pub baidu: usize,
    pub youdao: usize,
    pub gpt: usize,
}

/// GetNovel Handler
pub struct GetNovelHandler {
    novel_cache: Arc<NovelCache>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    metadata_expire: Duration,
}

impl GetNovelHandler {
    pub fn new(
        novel_cache: Arc<NovelCache>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        metadata_expire: Duration,
    ) -> Self {
        Self {
            novel_cache,
            chapter_repo,
            metadata_expire,
        }
    }

    pub async fn handle(&self, query: GetNovel) -> Result<NovelDetail, ApplicationError> {
        let novel = self
            .novel_cache
            .get_or_sync_remote(&query.novel, self.metadata_expire)
            .await?;

        let mut detail = NovelDetail {
            novel,
            jp: 0,
            baidu: 0,
            youdao: 0,
            gpt: 0,
        };
        for translator in TranslatorId::ALL {
            let stats = self
                .chapter_repo
                .paragraph_stats(&query.novel, translator)
                .await?;
            detail.jp = stats.jp;
            match translator {
                TranslatorId::Baidu => detail.baidu = stats.zh,
                TranslatorId::Youdao => detail.youdao = stats.zh,
                TranslatorId::Gpt => detail.gpt = stats.zh,
            }
        }

        Ok(detail)
    }
}

// ============================================================================
// GetChapter
// ============================================================================

/// 章节阅读视图
#[derive(Debug, Clone)]
pub struct ChapterDetail {
    pub title_src: String,
    pub title_translated: Option<String>,
    pub prev_id: Option<String>,
    pub next_id: Option<String>,
    pub paragraphs: Vec<String>,
    pub baidu: Option<Vec<String>>,
    pub youdao: Option<Vec<String>>,
    pub gpt: Option<Vec<String>>,
}

/// GetChapter Handler
pub struct GetChapterHandler {
    novel_cache: Arc<NovelCache>,
    chapter_cache: Arc<ChapterCache>,
    metadata_expire: Duration,
}

impl GetChapterHandler {
    pub fn new(
        novel_cache: Arc<NovelCache>,
        chapter_cache: Arc<ChapterCache>,
        metadata_expire: Duration,
    ) -> Self {
        Self {
            novel_cache,
            chapter_cache,
            metadata_expire,
        }
    }

    pub async fn handle(&self, query: GetChapter) -> Result<ChapterDetail, ApplicationError> {
        let novel = self
            .novel_cache
            .get_or_sync_remote(query.chapter.novel(), self.metadata_expire)
            .await?;

        let (entry, prev_id, next_id) = novel
            .locate_chapter(query.chapter.chapter_id())
            .ok_or_else(|| ApplicationError::not_found("Chapter", &query.chapter))?;
        let title_src = entry.title_src.clone();
        let title_translated = entry.title_translated.clone();
        let prev_id = prev_id.map(str::to_string);
        let next_id = next_id.map(str::to_string);

        let chapter = self
            .chapter_cache
            .get_or_sync_remote(&query.chapter, false)
            .await?;

        let paragraphs_of = |translator| {
            chapter
                .translation(translator)
                .map(|t| t.paragraphs.clone())
        };

        Ok(ChapterDetail {
            title_src,
            title_translated,
            prev_id,
            next_id,
            baidu: paragraphs_of(TranslatorId::Baidu),
            youdao: paragraphs_of(TranslatorId::Youdao),
            gpt: paragraphs_of(TranslatorId::Gpt),
            paragraphs: chapter.paragraphs.clone(),
        })
    }
}
