//! Novel Queries

use crate::domain::novel::{ChapterKey, NovelKey};

/// 获取小说详情
#[derive(Debug, Clone)]
pub struct GetNovel {
    pub novel: NovelKey,
}

/// 获取章节（阅读视图）
#[derive(Debug, Clone)]
pub struct GetChapter {
    pub chapter: ChapterKey,
}
