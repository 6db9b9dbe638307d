//! Persistence Layer - 数据持久化
//!
//! 小说元数据存 SQLite，章节文档存 Sled

pub mod sled;
pub mod sqlite;

pub use self::sled::SledChapterRepository;
pub use self::sqlite::SqliteNovelRepository;
