//! Translate Orchestrator
//!
//! 单个任务内严格按目录顺序串行执行，不并发翻译章节。
//! 失败策略：Skip 记录后继续下一单元，Abort 立即结束整个任务。

use chrono::Duration;
use serde::Serialize;
use std::sync::Arc;

use super::ProgressSink;
use crate::application::cache::{ChapterCache, NovelCache};
use crate::application::commands::handlers::{
    UpdateChapterTranslationHandler, UpdateMetadataTranslationHandler,
};
use crate::application::commands::{UpdateChapterTranslation, UpdateMetadataTranslation};
use crate::application::error::ApplicationError;
use crate::application::planner::TranslateTask;
use crate::application::ports::{
    ChapterRepositoryPort, NovelRepositoryPort, TranslationCounters, TranslatorError,
    TranslatorFactoryPort, TranslatorPort,
};
use crate::application::queries::handlers::{CheckChapterHandler, GetTranslateTaskHandler};
use crate::application::queries::{CheckChapter, GetTranslateTask};
use crate::domain::chapter::TranslationState;
use crate::domain::novel::NovelKey;
use crate::domain::TranslatorId;

/// 翻译任务参数
#[derive(Clone)]
pub struct TranslateRunRequest {
    pub novel: NovelKey,
    pub translator: TranslatorId,
    pub access_token: Option<String>,
    /// 章节窗口 [start_index, end_index)
    pub start_index: usize,
    pub end_index: usize,
    /// 重新翻译术语表过期的章节
    pub translate_expired: bool,
    /// 从源站重新同步（已翻译章节也会被检查）
    pub sync_from_provider: bool,
}

impl std::fmt::Debug for TranslateRunRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslateRunRequest")
            .field("novel", &self.novel)
            .field("translator", &self.translator)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("start_index", &self.start_index)
            .field("end_index", &self.end_index)
            .field("translate_expired", &self.translate_expired)
            .field("sync_from_provider", &self.sync_from_provider)
            .finish()
    }
}

/// 任务结局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// 所有选中章节都已处理
    Completed,
    /// 收到 Abort 提前结束
    Aborted,
    /// 规划失败或无法构造翻译器，没有处理任何章节
    NotStarted,
}

/// 任务汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcome: RunOutcome,
}

impl RunSummary {
    fn not_started() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            outcome: RunOutcome::NotStarted,
        }
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// 单元失败
enum UnitError {
    Skip(String),
    Abort(String),
}

impl From<ApplicationError> for UnitError {
    fn from(err: ApplicationError) -> Self {
        UnitError::Skip(err.to_string())
    }
}

impl From<TranslatorError> for UnitError {
    fn from(err: TranslatorError) -> Self {
        match err {
            TranslatorError::Skip(msg) => UnitError::Skip(msg),
            TranslatorError::Abort(msg) => UnitError::Abort(msg),
        }
    }
}

/// 同时写入 tracing 与进度回调
struct RunLogger<'a> {
    request: &'a TranslateRunRequest,
    sink: &'a dyn ProgressSink,
}

impl RunLogger<'_> {
    fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!(
            novel = %self.request.novel,
            translator = %self.request.translator,
            "{}",
            message
        );
        self.sink.log(message);
    }
}

/// 按窗口与状态筛选需要处理的章节，返回 (目录中的章节序号, chapterId)
///
/// - untranslated 总是处理
/// - expired 在 translate_expired 或 sync_from_provider 时处理
/// - translated 只在 sync_from_provider 时处理
pub(crate) fn select_chapters<'a>(
    task: &'a TranslateTask,
    request: &TranslateRunRequest,
) -> Vec<(usize, &'a str)> {
    task.chapters
        .iter()
        .enumerate()
        .filter(|(index, _)| *index >= request.start_index && *index < request.end_index)
        .filter(|(_, chapter)| match chapter.state {
            TranslationState::Untranslated => true,
            TranslationState::TranslatedAndExpired => {
                request.translate_expired || request.sync_from_provider
            }
            TranslationState::Translated => request.sync_from_provider,
        })
        .map(|(index, chapter)| (index, chapter.id.as_str()))
        .collect()
}

/// 翻译编排器
pub struct TranslateOrchestrator {
    get_task: GetTranslateTaskHandler,
    check_chapter: CheckChapterHandler,
    update_metadata: UpdateMetadataTranslationHandler,
    update_chapter: UpdateChapterTranslationHandler,
    translator_factory: Arc<dyn TranslatorFactoryPort>,
}

impl TranslateOrchestrator {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        novel_cache: Arc<NovelCache>,
        chapter_cache: Arc<ChapterCache>,
        translator_factory: Arc<dyn TranslatorFactoryPort>,
        metadata_expire: Duration,
    ) -> Self {
        Self {
            get_task: GetTranslateTaskHandler::new(novel_cache, chapter_repo, metadata_expire),
            check_chapter: CheckChapterHandler::new(novel_repo.clone(), chapter_cache.clone()),
            update_metadata: UpdateMetadataTranslationHandler::new(novel_repo.clone()),
            update_chapter: UpdateChapterTranslationHandler::new(novel_repo, chapter_cache),
            translator_factory,
        }
    }

    /// 执行一次翻译任务
    ///
    /// 单元级错误不会中断任务；规划与构造翻译器的错误在处理任何章节前结束任务
    pub async fn run(&self, request: &TranslateRunRequest, sink: &dyn ProgressSink) -> RunSummary {
        let logger = RunLogger { request, sink };
        let mut summary = RunSummary::not_started();

        logger.log("获取元数据");
        let task = match self
            .get_task
            .handle(GetTranslateTask {
                novel: request.novel.clone(),
                translator: request.translator,
            })
            .await
        {
            Ok(task) => task,
            Err(e) => {
                logger.log(format!("发生错误，结束翻译任务：{}", e));
                return summary;
            }
        };

        let translator = match self.translator_factory.create(
            request.translator,
            task.glossary.clone(),
            request.access_token.clone(),
        ) {
            Ok(translator) => translator,
            Err(e) => {
                logger.log(format!("发生错误，无法创建翻译器：{}", e));
                return summary;
            }
        };

        match self
            .translate_metadata(&task, request, translator.as_ref(), &logger)
            .await
        {
            Ok(()) => {}
            Err(UnitError::Abort(e)) => {
                logger.log(format!("发生错误，结束翻译任务：{}", e));
                summary.outcome = RunOutcome::Aborted;
                return summary;
            }
            Err(UnitError::Skip(e)) => {
                logger.log(format!("发生错误，跳过：{}", e));
                summary.failed += 1;
                sink.on_chapter_failure();
            }
        }

        let chapters = select_chapters(&task, request);
        summary.total = chapters.len();
        sink.on_start(chapters.len());
        if chapters.is_empty() {
            logger.log("没有需要更新的章节");
        }

        for (index, chapter_id) in chapters {
            let suffix = format!("[{}] {}/{}", index, request.novel, chapter_id);
            match self
                .translate_chapter(&task, request, chapter_id, &suffix, translator.as_ref(), &logger)
                .await
            {
                Ok(counters) => {
                    summary.succeeded += 1;
                    sink.on_chapter_success(counters);
                }
                Err(UnitError::Abort(e)) => {
                    logger.log(format!("发生错误，结束翻译任务：{}", e));
                    summary.outcome = RunOutcome::Aborted;
                    return summary;
                }
                Err(UnitError::Skip(e)) => {
                    logger.log(format!("发生错误，跳过：{}", e));
                    summary.failed += 1;
                    sink.on_chapter_failure();
                }
            }
        }

        summary.outcome = RunOutcome::Completed;
        tracing::info!(
            novel = %request.novel,
            translator = %request.translator,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Translate run completed"
        );
        summary
    }

    /// 批量翻译 [title?, introduction?, ...toc] 并上传
    async fn translate_metadata(
        &self,
        task: &TranslateTask,
        request: &TranslateRunRequest,
        translator: &dyn TranslatorPort,
        logger: &RunLogger<'_>,
    ) -> Result<(), UnitError> {
        let query = task.metadata_query();
        if query.is_empty() {
            return Ok(());
        }
        if !translator.supports_metadata() {
            logger.log(format!("{} 翻译目录不稳定，跳过元数据", request.translator));
            return Ok(());
        }

        logger.log("翻译元数据");
        let translated = translator.translate(query).await?;
        let translation = task
            .decode_metadata(translated)
            .ok_or_else(|| UnitError::Skip("翻译文本长度不匹配".to_string()))?;

        logger.log("上传元数据");
        self.update_metadata
            .handle(UpdateMetadataTranslation {
                novel: request.novel.clone(),
                translator: request.translator,
                translation,
            })
            .await?;
        Ok(())
    }

    /// 处理单个章节；无需翻译时返回 None
    async fn translate_chapter(
        &self,
        task: &TranslateTask,
        request: &TranslateRunRequest,
        chapter_id: &str,
        suffix: &str,
        translator: &dyn TranslatorPort,
        logger: &RunLogger<'_>,
    ) -> Result<Option<TranslationCounters>, UnitError> {
        let chapter = request
            .novel
            .chapter(chapter_id)
            .map_err(|e| UnitError::Skip(e.to_string()))?;

        logger.log(format!("获取章节{}", suffix));
        let texts_jp = self
            .check_chapter
            .handle(CheckChapter {
                chapter: chapter.clone(),
                translator: request.translator,
                sync: request.sync_from_provider,
            })
            .await?;

        if texts_jp.is_empty() {
            logger.log("无需翻译");
            return Ok(None);
        }

        logger.log(format!("翻译章节{}", suffix));
        let texts_zh = translator.translate(texts_jp).await?;

        logger.log(format!("上传章节{}", suffix));
        let counters = self
            .update_chapter
            .handle(UpdateChapterTranslation {
                chapter,
                translator: request.translator,
                glossary_version: task.glossary_version.clone(),
                paragraphs_zh: texts_zh,
            })
            .await?;

        Ok(Some(counters))
    }
}
