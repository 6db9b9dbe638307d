//! Novel Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entities::merge_toc;
use super::{Glossary, GlossaryVersion, NovelKey, TocEntry, VersionedGlossary};

/// 元数据译文（翻译器对 title / introduction / toc 批量翻译的结果）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTranslation {
    pub title: Option<String>,
    pub introduction: Option<String>,
    /// 源目录标题 -> 译文标题
    pub toc: BTreeMap<String, String>,
}

/// Novel 聚合根
///
/// 不变量:
/// - 目录顺序即章节前后顺序
/// - 术语表为空时版本为空
/// - 目录或内容变化时 change_at 前进
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Novel {
    pub key: NovelKey,
    pub title_src: String,
    pub title_translated: Option<String>,
    pub introduction_src: String,
    pub introduction_translated: Option<String>,
    pub toc: Vec<TocEntry>,
    glossary: VersionedGlossary,
    pub sync_at: DateTime<Utc>,
    pub change_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// 存储修订号，0 表示尚未保存
    pub revision: u64,
}

impl Novel {
    /// 首次从源站同步时创建
    pub fn new(
        key: NovelKey,
        title_src: impl Into<String>,
        introduction_src: impl Into<String>,
        toc: Vec<TocEntry>,
    ) -> Self {
        let now = Utc::now();
        let toc = toc
            .into_iter()
            .map(|mut entry| {
                if entry.chapter_id.is_some() && entry.created_at.is_none() {
                    entry.created_at = Some(now);
                }
                entry
            })
            .collect();
        Self {
            key,
            title_src: title_src.into(),
            title_translated: None,
            introduction_src: introduction_src.into(),
            introduction_translated: None,
            toc,
            glossary: VersionedGlossary::empty(),
            sync_at: now,
            change_at: now,
            created_at: now,
            revision: 0,
        }
    }

    /// 从存储恢复，术语表不变量已由 VersionedGlossary 校验
    pub fn with_glossary(mut self, glossary: VersionedGlossary) -> Self {
        self.glossary = glossary;
        self
    }

    pub fn glossary(&self) -> &Glossary {
        self.glossary.map()
    }

    pub fn glossary_version(&self) -> Option<&GlossaryVersion> {
        self.glossary.version()
    }

    pub fn versioned_glossary(&self) -> &VersionedGlossary {
        &self.glossary
    }

    /// 替换术语表，内容相同则不生成新版本
    ///
    /// 返回是否发生变化
    pub fn replace_glossary(&mut self, map: Glossary) -> bool {
        if self.glossary.map() == &map {
            return false;
        }
        self.glossary = VersionedGlossary::new(map);
        true
    }

    /// 目录中所有章节 ID（按目录顺序）
    pub fn chapter_ids(&self) -> Vec<&str> {
        self.toc
            .iter()
            .filter_map(|entry| entry.chapter_id.as_deref())
            .collect()
    }

    /// 章节在目录中的位置：(条目, 上一章 ID, 下一章 ID)
    pub fn locate_chapter(&self, chapter_id: &str) -> Option<(&TocEntry, Option<&str>, Option<&str>)> {
        let chapters: Vec<&TocEntry> = self.toc.iter().filter(|e| e.is_chapter()).collect();
        let index = chapters
            .iter()
            .position(|e| e.chapter_id.as_deref() == Some(chapter_id))?;
        let prev = index
            .checked_sub(1)
            .and_then(|i| chapters.get(i))
            .and_then(|e| e.chapter_id.as_deref());
        let next = chapters.get(index + 1).and_then(|e| e.chapter_id.as_deref());
        Some((chapters[index], prev, next))
    }

    /// 用源站最新元数据刷新
    pub fn apply_remote(
        &mut self,
        title_src: String,
        introduction_src: String,
        toc: Vec<TocEntry>,
        now: DateTime<Utc>,
    ) {
        let (merged, toc_changed) = merge_toc(&self.toc, toc, now);
        self.title_src = title_src;
        self.introduction_src = introduction_src;
        self.toc = merged;
        self.sync_at = now;
        if toc_changed {
            self.change_at = now;
        }
    }

    /// 元数据是否在 expire 内同步过
    pub fn is_fresh(&self, expire: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.sync_at < expire
    }

    /// 写入元数据译文，只填充当前为空的字段
    ///
    /// 返回是否有字段被写入
    pub fn apply_metadata_translation(
        &mut self,
        translation: &MetadataTranslation,
        now: DateTime<Utc>,
    ) -> bool {
        let mut changed = false;

        if self.title_translated.is_none() {
            if let Some(title) = &translation.title {
                self.title_translated = Some(title.clone());
                changed = true;
            }
        }

        if self.introduction_translated.is_none() {
            if let Some(introduction) = &translation.introduction {
                self.introduction_translated = Some(introduction.clone());
                changed = true;
            }
        }

        for entry in self.toc.iter_mut() {
            if entry.title_translated.is_none() {
                if let Some(title) = translation.toc.get(&entry.title_src) {
                    entry.title_translated = Some(title.clone());
                    changed = true;
                }
            }
        }

        if changed {
            self.change_at = now;
        }
        changed
    }

    /// 标记内容变化
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.change_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Novel {
        Novel::new(
            NovelKey::new("kakuyomu", "1").unwrap(),
            "異世界",
            "あらすじ",
            vec![
                TocEntry::volume("第一章"),
                TocEntry::chapter("第一話", "c1"),
                TocEntry::chapter("第二話", "c2"),
            ],
        )
    }

    #[test]
    fn test_chapter_ids_in_toc_order() {
        let novel = sample();
        assert_eq!(novel.chapter_ids(), vec!["c1", "c2"]);
        assert!(novel.glossary_version().is_none());
    }

    #[test]
    fn test_locate_chapter() {
        let novel = sample();
        let (entry, prev, next) = novel.locate_chapter("c1").unwrap();
        assert_eq!(entry.title_src, "第一話");
        assert_eq!(prev, None);
        assert_eq!(next, Some("c2"));
        assert!(novel.locate_chapter("c9").is_none());
    }

    #[test]
    fn test_replace_glossary_bumps_version() {
        let mut novel = sample();
        let mut map = Glossary::new();
        map.insert("勇者".into(), "勇者".into());

        assert!(novel.replace_glossary(map.clone()));
        let version = novel.glossary_version().cloned();
        assert!(version.is_some());

        // 相同内容不生成新版本
        assert!(!novel.replace_glossary(map));
        assert_eq!(novel.glossary_version().cloned(), version);

        assert!(novel.replace_glossary(Glossary::new()));
        assert!(novel.glossary_version().is_none());
    }

    #[test]
    fn test_metadata_translation_never_overwrites() {
        let mut novel = sample();
        novel.title_translated = Some("已有标题".into());
        let before = novel.change_at;

        let mut toc = BTreeMap::new();
        toc.insert("第一話".to_string(), "第一话".to_string());
        let translation = MetadataTranslation {
            title: Some("新标题".into()),
            introduction: Some("简介".into()),
            toc,
        };

        let now = before + chrono::Duration::seconds(1);
        assert!(novel.apply_metadata_translation(&translation, now));
        assert_eq!(novel.title_translated.as_deref(), Some("已有标题"));
        assert_eq!(novel.introduction_translated.as_deref(), Some("简介"));
        assert_eq!(novel.toc[1].title_translated.as_deref(), Some("第一话"));
        assert_eq!(novel.change_at, now);

        // 再次写入无变化
        assert!(!novel.apply_metadata_translation(&translation, now));
    }

    #[test]
    fn test_apply_remote_bumps_change_at_on_toc_change() {
        let mut novel = sample();
        let before = novel.change_at;
        let later = before + chrono::Duration::minutes(5);
        let mut toc = novel.toc.clone();
        toc.push(TocEntry::chapter("第三話", "c3"));

        novel.apply_remote("異世界".into(), "あらすじ".into(), toc, later);
        assert_eq!(novel.change_at, later);
        assert_eq!(novel.sync_at, later);
        assert!(novel.is_fresh(chrono::Duration::minutes(10), later));
    }
}
