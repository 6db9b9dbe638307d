//! Translate Command Handlers

use chrono::Utc;
use std::sync::Arc;

use crate::application::cache::{ChapterCache, NOVEL_WRITE_ATTEMPTS};
use crate::application::commands::{
    UpdateChapterTranslation, UpdateGlossary, UpdateMetadataTranslation,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{NovelRepositoryPort, RepositoryError, TranslationCounters};
use crate::domain::novel::GlossaryVersion;

// ============================================================================
// UpdateMetadataTranslation
// ============================================================================

/// UpdateMetadataTranslation Handler
pub struct UpdateMetadataTranslationHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl UpdateMetadataTranslationHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    /// 只填充当前为空的译文字段，返回是否有写入
    ///
    /// 修订号冲突时基于最新记录重新填充
    pub async fn handle(&self, command: UpdateMetadataTranslation) -> Result<bool, ApplicationError> {
        for attempt in 1..=NOVEL_WRITE_ATTEMPTS {
            let mut novel = self
                .novel_repo
                .find(&command.novel)
                .await?
                .ok_or_else(|| ApplicationError::not_found("Novel", &command.novel))?;

            let changed = novel.apply_metadata_translation(&command.translation, Utc::now());
            if changed {
                match self.novel_repo.update_translated_metadata(&novel).await {
                    Ok(_) => {}
                    Err(RepositoryError::Conflict(e)) => {
                        tracing::debug!(
                            novel = %command.novel,
                            attempt,
                            error = %e,
                            "Novel changed during metadata upload, retrying"
                        );
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            tracing::info!(
                novel = %command.novel,
                translator = %command.translator,
                changed = changed,
                "Metadata translation uploaded"
            );
            return Ok(changed);
        }

        Err(ApplicationError::RepositoryError(format!(
            "novel {} kept changing during metadata upload",
            command.novel
        )))
    }
}

// ============================================================================
// UpdateChapterTranslation
// ============================================================================

/// UpdateChapterTranslation Handler
pub struct UpdateChapterTranslationHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_cache: Arc<ChapterCache>,
}

impl UpdateChapterTranslationHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>, chapter_cache: Arc<ChapterCache>) -> Self {
        Self {
            novel_repo,
            chapter_cache,
        }
    }

    /// 术语表版本与小说当前版本不一致时拒绝写入
    pub async fn handle(
        &self,
        command: UpdateChapterTranslation,
    ) -> Result<TranslationCounters, ApplicationError> {
        let novel_key = command.chapter.novel();
        let novel = self
            .novel_repo
            .find(novel_key)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", novel_key))?;

        if command.glossary_version.as_ref() != novel.glossary_version() {
            tracing::warn!(
                chapter = %command.chapter,
                translator = %command.translator,
                "Rejected translation with stale glossary version"
            );
            return Err(ApplicationError::GlossaryStale);
        }

        self.chapter_cache
            .update_translation(
                &command.chapter,
                command.translator,
                novel.versioned_glossary(),
                command.paragraphs_zh,
            )
            .await
    }
}

// ============================================================================
// UpdateGlossary
// ============================================================================

/// UpdateGlossary Handler
pub struct UpdateGlossaryHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl UpdateGlossaryHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    /// 返回编辑后的术语表版本
    pub async fn handle(
        &self,
        command: UpdateGlossary,
    ) -> Result<Option<GlossaryVersion>, ApplicationError> {
        let mut novel = self
            .novel_repo
            .find(&command.novel)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", &command.novel))?;

        if novel.replace_glossary(command.glossary) {
            self.novel_repo
                .update_glossary(&command.novel, novel.versioned_glossary())
                .await?;
            tracing::info!(
                novel = %command.novel,
                terms = novel.glossary().len(),
                version = ?novel.glossary_version(),
                "Glossary updated"
            );
        }

        Ok(novel.glossary_version().cloned())
    }
}
