//! 缓存服务
//!
//! 小说元数据与章节正文的本地缓存，按需回源同步

mod chapter_cache;
mod novel_cache;

pub use chapter_cache::ChapterCache;
pub use novel_cache::{NovelCache, DEFAULT_METADATA_EXPIRE_MINUTES};
pub(crate) use novel_cache::NOVEL_WRITE_ATTEMPTS;
