//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Novel Context: 小说元数据、目录、术语表
//! - Chapter Context: 章节缓存与翻译状态

pub mod chapter;
pub mod novel;

mod novel_file;
mod translator;

pub use novel_file::{FileArtifactKey, FileLang, FileType};
pub use translator::TranslatorId;
