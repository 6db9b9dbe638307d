//! Translate Queries

use crate::domain::novel::{ChapterKey, NovelKey};
use crate::domain::TranslatorId;

/// 获取翻译任务
#[derive(Debug, Clone)]
pub struct GetTranslateTask {
    pub novel: NovelKey,
    pub translator: TranslatorId,
}

/// 检查章节是否需要翻译
///
/// 需要翻译时返回源段落，否则返回空列表
#[derive(Debug, Clone)]
pub struct CheckChapter {
    pub chapter: ChapterKey,
    pub translator: TranslatorId,
    /// 强制从源站重新同步
    pub sync: bool,
}

/// 获取后台翻译任务状态
#[derive(Debug, Clone)]
pub struct GetTranslateRun {
    pub run_id: String,
}
