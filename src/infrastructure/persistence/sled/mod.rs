//! Sled Persistence - 章节文档存储

mod chapter_repo;

pub use chapter_repo::SledChapterRepository;
