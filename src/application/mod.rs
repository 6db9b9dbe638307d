//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、SourceProvider、Translator、RunManager 等）
//! - cache: 小说元数据与章节缓存
//! - planner: 翻译任务规划
//! - orchestrator: 翻译任务执行
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod cache;
pub mod commands;
pub mod error;
pub mod orchestrator;
pub mod planner;
pub mod ports;
pub mod queries;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use cache::{ChapterCache, NovelCache, DEFAULT_METADATA_EXPIRE_MINUTES};

pub use commands::{
    // Translate commands
    UpdateChapterTranslation,
    UpdateGlossary,
    UpdateMetadataTranslation,
    // File commands
    MaterializeFile,
    // Run commands
    SubmitTranslateRun,
    // Handlers
    handlers::{
        MaterializeFileHandler, MaterializedFile, SubmitTranslateRunHandler,
        SubmitTranslateRunResponse, UpdateChapterTranslationHandler, UpdateGlossaryHandler,
        UpdateMetadataTranslationHandler,
    },
};

pub use error::ApplicationError;

pub use orchestrator::{
    NoopProgressSink, ProgressSink, RunOutcome, RunSummary, TranslateOrchestrator,
    TranslateRunRequest,
};

pub use planner::{plan_task, ChapterTask, TranslateTask};

pub use ports::{
    // Repositories
    ChapterRepositoryPort,
    ChapterWriteError,
    NovelRepositoryPort,
    RepositoryError,
    TranslationCounters,
    // Source provider
    SourceFetchError,
    SourceProviderPort,
    // Translator
    TranslatorError,
    TranslatorFactoryPort,
    TranslatorPort,
    // Files
    FileArtifactStoragePort,
    NovelFileRendererPort,
    // Run manager
    RunManagerPort,
    RunState,
    TranslateRun,
};

pub use queries::{
    // Novel queries
    GetChapter,
    GetNovel,
    // Translate queries
    CheckChapter,
    GetTranslateRun,
    GetTranslateTask,
    // Handlers
    handlers::{
        ChapterDetail, CheckChapterHandler, GetChapterHandler, GetNovelHandler,
        GetTranslateRunHandler, GetTranslateTaskHandler, NovelDetail,
    },
};
