//! Chapter Cache - 章节缓存
//!
//! 读写契约：
//! - get 只查本地
//! - get_or_sync_remote 在本地缺失或强制同步时回源，并保留已有译文
//! - update_translation 原子写入某个翻译器的译文

use chrono::Utc;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRepositoryPort, NovelRepositoryPort, SourceFetchError, SourceProviderPort,
    TranslationCounters,
};
use crate::domain::chapter::{Chapter, ChapterTranslation};
use crate::domain::novel::{ChapterKey, VersionedGlossary};
use crate::domain::TranslatorId;

/// 章节缓存
pub struct ChapterCache {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    novel_repo: Arc<dyn NovelRepositoryPort>,
    provider: Arc<dyn SourceProviderPort>,
}

impl ChapterCache {
    pub fn new(
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        provider: Arc<dyn SourceProviderPort>,
    ) -> Self {
        Self {
            chapter_repo,
            novel_repo,
            provider,
        }
    }

    /// 本地查找，不触发网络
    pub async fn get(&self, key: &ChapterKey) -> Result<Option<Chapter>, ApplicationError> {
        Ok(self.chapter_repo.find(key).await?)
    }

    /// 返回缓存章节；缺失或 force_sync 时回源抓取并写入
    pub async fn get_or_sync_remote(
        &self,
        key: &ChapterKey,
        force_sync: bool,
    ) -> Result<Chapter, ApplicationError> {
        if !force_sync {
            if let Some(chapter) = self.chapter_repo.find(key).await? {
                return Ok(chapter);
            }
        }

        let remote = self.provider.fetch_chapter(key).await.map_err(|e| match e {
            SourceFetchError::NotFound(_) => ApplicationError::not_found("Chapter", key),
            other => other.into(),
        })?;

        let chapter = self.chapter_repo.save_source(key, remote.paragraphs).await?;
        self.novel_repo.touch_change_at(key.novel(), Utc::now()).await?;

        tracing::info!(
            chapter = %key,
            paragraphs = chapter.paragraphs.len(),
            force_sync = force_sync,
            "Chapter synced from provider"
        );

        Ok(chapter)
    }

    /// 写入译文并返回小说的段落计数
    pub async fn update_translation(
        &self,
        key: &ChapterKey,
        translator: TranslatorId,
        glossary: &VersionedGlossary,
        paragraphs_zh: Vec<String>,
    ) -> Result<TranslationCounters, ApplicationError> {
        let translation = ChapterTranslation {
            paragraphs: paragraphs_zh,
            glossary_version: glossary.version().cloned(),
            glossary: glossary.map().clone(),
        };

        self.chapter_repo
            .update_translation(key, translator, translation)
            .await?;
        self.novel_repo.touch_change_at(key.novel(), Utc::now()).await?;

        let counters = self
            .chapter_repo
            .paragraph_stats(key.novel(), translator)
            .await?;

        tracing::info!(
            chapter = %key,
            translator = %translator,
            jp = counters.jp,
            zh = counters.zh,
            "Chapter translation updated"
        );

        Ok(counters)
    }
}
