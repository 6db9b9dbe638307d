//! Novel Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 目录条目
///
/// chapter_id 为空表示非章节条目（如卷标题）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title_src: String,
    pub title_translated: Option<String>,
    pub chapter_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TocEntry {
    pub fn chapter(title_src: impl Into<String>, chapter_id: impl Into<String>) -> Self {
        Self {
            title_src: title_src.into(),
            title_translated: None,
            chapter_id: Some(chapter_id.into()),
            created_at: None,
        }
    }

    pub fn volume(title_src: impl Into<String>) -> Self {
        Self {
            title_src: title_src.into(),
            title_translated: None,
            chapter_id: None,
            created_at: None,
        }
    }

    pub fn is_chapter(&self) -> bool {
        self.chapter_id.is_some()
    }

    /// 与另一条目是否指向同一位置（同源标题、同章节）
    fn same_source(&self, other: &TocEntry) -> bool {
        self.title_src == other.title_src && self.chapter_id == other.chapter_id
    }
}

/// 合并远端目录
///
/// 保留源标题未变条目的译文标题与创建时间，新条目以 now 标记。
/// 返回合并后的目录以及目录是否发生变化。
pub fn merge_toc(
    local: &[TocEntry],
    remote: Vec<TocEntry>,
    now: DateTime<Utc>,
) -> (Vec<TocEntry>, bool) {
    let mut changed = local.len() != remote.len();

    let merged: Vec<TocEntry> = remote
        .into_iter()
        .enumerate()
        .map(|(index, mut entry)| {
            let previous = local
                .get(index)
                .filter(|old| old.same_source(&entry))
                .or_else(|| local.iter().find(|old| old.same_source(&entry)));

            match previous {
                Some(old) => {
                    if local.get(index).map_or(true, |at| !at.same_source(&entry)) {
                        changed = true;
                    }
                    entry.title_translated = old.title_translated.clone();
                    entry.created_at = old.created_at.or(entry.created_at);
                }
                None => {
                    changed = true;
                    if entry.chapter_id.is_some() && entry.created_at.is_none() {
                        entry.created_at = Some(now);
                    }
                }
            }
            entry
        })
        .collect();

    (merged, changed)
}
