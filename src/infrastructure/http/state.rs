//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use chrono::Duration;
use std::sync::Arc;

use crate::application::{
    // Caches
    ChapterCache, NovelCache,
    // Command handlers
    MaterializeFileHandler, SubmitTranslateRunHandler, UpdateChapterTranslationHandler,
    UpdateGlossaryHandler, UpdateMetadataTranslationHandler,
    // Query handlers
    CheckChapterHandler, GetChapterHandler, GetNovelHandler, GetTranslateRunHandler,
    GetTranslateTaskHandler,
    // Ports
    ChapterRepositoryPort, FileArtifactStoragePort, NovelFileRendererPort, NovelRepositoryPort,
    RunManagerPort, SourceProviderPort,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub run_manager: Arc<dyn RunManagerPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub update_metadata_handler: UpdateMetadataTranslationHandler,
    pub update_chapter_handler: UpdateChapterTranslationHandler,
    pub update_glossary_handler: UpdateGlossaryHandler,
    pub materialize_file_handler: MaterializeFileHandler,
    pub submit_run_handler: SubmitTranslateRunHandler,

    // ========== Query Handlers ==========
    pub get_novel_handler: GetNovelHandler,
    pub get_chapter_handler: GetChapterHandler,
    pub get_translate_task_handler: GetTranslateTaskHandler,
    pub check_chapter_handler: CheckChapterHandler,
    pub get_run_handler: GetTranslateRunHandler,
}

impl AppState {
    /// 创建应用状态
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        source_provider: Arc<dyn SourceProviderPort>,
        file_storage: Arc<dyn FileArtifactStoragePort>,
        file_renderer: Arc<dyn NovelFileRendererPort>,
        run_manager: Arc<dyn RunManagerPort>,
        event_publisher: Arc<EventPublisher>,
        metadata_expire: Duration,
    ) -> Self {
        let novel_cache = Arc::new(NovelCache::new(novel_repo.clone(), source_provider.clone()));
        let chapter_cache = Arc::new(ChapterCache::new(
            chapter_repo.clone(),
            novel_repo.clone(),
            source_provider,
        ));

        Self {
            // Ports
            run_manager: run_manager.clone(),
            event_publisher,

            // Command handlers
            update_metadata_handler: UpdateMetadataTranslationHandler::new(novel_repo.clone()),
            update_chapter_handler: UpdateChapterTranslationHandler::new(
                novel_repo.clone(),
                chapter_cache.clone(),
            ),
            update_glossary_handler: UpdateGlossaryHandler::new(novel_repo.clone()),
            materialize_file_handler: MaterializeFileHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                file_storage,
                file_renderer,
            ),
            submit_run_handler: SubmitTranslateRunHandler::new(run_manager.clone()),

            // Query handlers
            get_novel_handler: GetNovelHandler::new(
                novel_cache.clone(),
                chapter_repo.clone(),
                metadata_expire,
            ),
            get_chapter_handler: GetChapterHandler::new(
                novel_cache.clone(),
                chapter_cache.clone(),
                metadata_expire,
            ),
            get_translate_task_handler: GetTranslateTaskHandler::new(
                novel_cache,
                chapter_repo,
                metadata_expire,
            ),
            check_chapter_handler: CheckChapterHandler::new(novel_repo, chapter_cache),
            get_run_handler: GetTranslateRunHandler::new(run_manager),
        }
    }
}
