//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod file_artifact;
mod repositories;
mod run_manager;
mod source_provider;
mod translator;

pub use file_artifact::{
    FileArtifactError, FileArtifactStoragePort, NovelFileRendererPort, RenderError,
    StoredArtifact,
};
pub use repositories::{
    ChapterRepositoryPort, ChapterWriteError, NovelRepositoryPort, RepositoryError,
    TranslationCounters,
};
pub use run_manager::{RunError, RunManagerPort, RunState, TranslateRun};
pub use source_provider::{RemoteChapter, RemoteNovelMetadata, SourceFetchError, SourceProviderPort};
pub use translator::{
    TranslatorCreateError, TranslatorError, TranslatorFactoryPort, TranslatorPort,
};
