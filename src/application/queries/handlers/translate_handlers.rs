//! Translate Query Handlers

use chrono::Duration;
use std::sync::Arc;

use crate::application::cache::{ChapterCache, NovelCache};
use crate::application::error::ApplicationError;
use crate::application::planner::{plan_task, TranslateTask};
use crate::application::ports::{ChapterRepositoryPort, NovelRepositoryPort};
use crate::application::queries::{CheckChapter, GetTranslateTask};
use crate::domain::chapter::TranslationState;

// ============================================================================
// GetTranslateTask
// ============================================================================

/// GetTranslateTask Handler
pub struct GetTranslateTaskHandler {
    novel_cache: Arc<NovelCache>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    metadata_expire: Duration,
}

impl GetTranslateTaskHandler {
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

    pub async fn handle(&self, query: GetTranslateTask) -> Result<TranslateTask, ApplicationError> {
        let novel = self
            .novel_cache
            .get_or_sync_remote(&query.novel, self.metadata_expire)
            .await?;

        let outlines = self
            .chapter_repo
            .translation_outlines(&novel.key, query.translator)
            .await?;

        let task = plan_task(&novel, &outlines);

        tracing::debug!(
            novel = %query.novel,
            translator = %query.translator,
            chapters = task.chapters.len(),
            toc = task.toc.len(),
            "Translate task planned"
        );

        Ok(task)
    }
}

// ============================================================================
// CheckChapter
// ============================================================================

/// CheckChapter Handler
pub struct CheckChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_cache: Arc<ChapterCache>,
}

impl CheckChapterHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>, chapter_cache: Arc<ChapterCache>) -> Self {
        Self {
            novel_repo,
            chapter_cache,
        }
    }

    /// 返回待翻译的源段落；无需翻译时返回空列表
    pub async fn handle(&self, query: CheckChapter) -> Result<Vec<String>, ApplicationError> {
        let novel_key = query.chapter.novel();
        let novel = self
            .novel_repo
            .find(novel_key)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", novel_key))?;

        let chapter = self
            .chapter_cache
            .get_or_sync_remote(&query.chapter, query.sync)
            .await?;

        let state = chapter.state_for(query.translator, novel.glossary_version());
        // 重新同步后源段落数变化的译文不再可用
        let aligned = chapter
            .translation(query.translator)
            .map(|t| t.paragraphs.len() == chapter.paragraphs.len())
            .unwrap_or(false);

        if state == TranslationState::Translated && aligned {
            Ok(Vec::new())
        } else {
            Ok(chapter.paragraphs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Fixture;
    use crate::domain::novel::{Glossary, VersionedGlossary};
    use crate::domain::TranslatorId;

    #[tokio::test]
    async fn test_check_chapter_empty_when_translated() {
        let fixture = Fixture::new().await;
        let novel = fixture.sync_novel().await;
        let handler = CheckChapterHandler::new(fixture.novel_repo.clone(), fixture.chapter_cache().into());

        let query = CheckChapter {
            chapter: fixture.chapter_key("c1"),
            translator: TranslatorId::Baidu,
            sync: false,
        };
        let paragraphs = handler.handle(query.clone()).await.unwrap();
        assert_eq!(paragraphs.len(), 2);

        fixture
            .chapter_cache()
            .update_translation(
                &query.chapter,
                TranslatorId::Baidu,
                novel.versioned_glossary(),
                vec!["甲".into(), "乙".into()],
            )
            .await
            .unwrap();
        assert!(handler.handle(query.clone()).await.unwrap().is_empty());

        // 其他翻译器不受影响
        let youdao = CheckChapter {
            translator: TranslatorId::Youdao,
            ..query
        };
        assert_eq!(handler.handle(youdao).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_check_chapter_returns_paragraphs_when_expired() {
        let fixture = Fixture::new().await;
        fixture.sync_novel().await;
        let handler = CheckChapterHandler::new(fixture.novel_repo.clone(), fixture.chapter_cache().into());
        let key = fixture.chapter_key("c1");

        fixture.chapter_cache().get_or_sync_remote(&key, false).await.unwrap();
        fixture
            .chapter_cache()
            .update_translation(
                &key,
                TranslatorId::Baidu,
                &VersionedGlossary::empty(),
                vec!["甲".into(), "乙".into()],
            )
            .await
            .unwrap();

        let mut glossary = Glossary::new();
        glossary.insert("勇者".into(), "勇者".into());
        fixture.set_glossary(glossary).await;

        let query = CheckChapter {
            chapter: key,
            translator: TranslatorId::Baidu,
            sync: false,
        };
        assert_eq!(handler.handle(query).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_check_chapter_unknown_novel() {
        let fixture = Fixture::new().await;
        let handler = CheckChapterHandler::new(fixture.novel_repo.clone(), fixture.chapter_cache().into());

        let result = handler
            .handle(CheckChapter {
                chapter: fixture.chapter_key("c1"),
                translator: TranslatorId::Gpt,
                sync: false,
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_translate_task_uses_cached_outlines() {
        let fixture = Fixture::new().await;
        let handler = GetTranslateTaskHandler::new(
            fixture.novel_cache().into(),
            fixture.chapter_repo.clone(),
            Duration::minutes(10),
        );

        let task = handler
            .handle(GetTranslateTask {
                novel: fixture.novel_key(),
                translator: TranslatorId::Baidu,
            })
            .await
            .unwrap();
        assert_eq!(task.chapters.len(), 3);
        assert_eq!(task.title.as_deref(), Some("異世界転生"));
        assert_eq!(fixture.provider.chapter_calls(), 0);
    }
}
