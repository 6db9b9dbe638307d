//! Translation Task Planner
//!
//! 计算一部小说在某个翻译器下需要翻译的元数据与章节

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::domain::chapter::{ChapterTranslationOutline, TranslationState};
use crate::domain::novel::{Glossary, GlossaryVersion, MetadataTranslation, Novel};

/// 章节及其翻译状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterTask {
    pub id: String,
    pub state: TranslationState,
}

/// 翻译任务
///
/// glossary_version 是规划时的快照，上传章节译文时必须原样带回
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    pub toc: Vec<String>,
    pub glossary_version: Option<GlossaryVersion>,
    pub glossary: Glossary,
    pub chapters: Vec<ChapterTask>,
}

impl TranslateTask {
    /// 元数据待翻译文本：[title?, introduction?, ...toc]
    pub fn metadata_query(&self) -> Vec<String> {
        let mut query = Vec::with_capacity(self.toc.len() + 2);
        query.extend(self.title.iter().cloned());
        query.extend(self.introduction.iter().cloned());
        query.extend(self.toc.iter().cloned());
        query
    }

    /// 按 metadata_query 的顺序还原译文
    ///
    /// 长度不一致时返回 None
    pub fn decode_metadata(&self, translated: Vec<String>) -> Option<MetadataTranslation> {
        let expected =
            self.toc.len() + usize::from(self.title.is_some()) + usize::from(self.introduction.is_some());
        if translated.len() != expected {
            return None;
        }

        let mut iter = translated.into_iter();
        let mut result = MetadataTranslation::default();
        if self.title.is_some() {
            result.title = iter.next();
        }
        if self.introduction.is_some() {
            result.introduction = iter.next();
        }
        for (src, dst) in self.toc.iter().zip(iter) {
            result.toc.insert(src.clone(), dst);
        }
        Some(result)
    }
}

/// 规划翻译任务
///
/// - title / introduction 只在译文为空时给出
/// - toc 为缺少译文的源标题（去重，保持目录顺序）
/// - chapters 为目录中所有章节，按目录顺序，状态每次重新计算
pub fn plan_task(novel: &Novel, outlines: &[ChapterTranslationOutline]) -> TranslateTask {
    let title = novel
        .title_translated
        .is_none()
        .then(|| novel.title_src.clone());
    let introduction = novel
        .introduction_translated
        .is_none()
        .then(|| novel.introduction_src.clone());

    let mut seen = HashSet::new();
    let toc = novel
        .toc
        .iter()
        .filter(|entry| entry.title_translated.is_none())
        .map(|entry| entry.title_src.clone())
        .filter(|title| seen.insert(title.clone()))
        .collect();

    let outlines: HashMap<&str, &ChapterTranslationOutline> = outlines
        .iter()
        .map(|outline| (outline.chapter_id.as_str(), outline))
        .collect();
    let version = novel.glossary_version();
    let chapters = novel
        .chapter_ids()
        .into_iter()
        .map(|id| ChapterTask {
            id: id.to_string(),
            state: outlines
                .get(id)
                .map(|outline| outline.state(version))
                .unwrap_or(TranslationState::Untranslated),
        })
        .collect();

    TranslateTask {
        title,
        introduction,
        toc,
        glossary_version: version.cloned(),
        glossary: novel.glossary().clone(),
        chapters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::novel::{NovelKey, TocEntry};

    fn novel() -> Novel {
        Novel::new(
            NovelKey::new("kakuyomu", "1").unwrap(),
            "異世界",
            "あらすじ",
            vec![
                TocEntry::volume("第一章"),
                TocEntry::chapter("プロローグ", "c1"),
                TocEntry::volume("第二章"),
                TocEntry::chapter("プロローグ", "c2"),
                TocEntry::chapter("第三話", "c3"),
            ],
        )
    }

    fn outline(id: &str, version: Option<&GlossaryVersion>) -> ChapterTranslationOutline {
        ChapterTranslationOutline {
            chapter_id: id.to_string(),
            translated: true,
            glossary_version: version.cloned(),
        }
    }

    #[test]
    fn test_plan_untranslated_novel() {
        let task = plan_task(&novel(), &[]);
        assert_eq!(task.title.as_deref(), Some("異世界"));
        assert_eq!(task.introduction.as_deref(), Some("あらすじ"));
        assert_eq!(task.toc, vec!["第一章", "プロローグ", "第二章", "第三話"]);
        assert_eq!(task.chapters.len(), 3);
        assert!(task
            .chapters
            .iter()
            .all(|c| c.state == TranslationState::Untranslated));
        assert!(task.glossary_version.is_none());
    }

    #[test]
    fn test_translated_metadata_is_not_replanned() {
        let mut novel = novel();
        novel.title_translated = Some("异世界".into());
        novel.toc[1].title_translated = Some("序章".into());

        let task = plan_task(&novel, &[]);
        assert!(task.title.is_none());
        assert!(task.introduction.is_some());
        // c2 仍使用相同源标题且缺少译文
        assert!(task.toc.contains(&"プロローグ".to_string()));
    }

    #[test]
    fn test_glossary_change_expires_chapters() {
        let mut novel = novel();
        let outlines = vec![outline("c1", None), outline("c2", None)];

        let task = plan_task(&novel, &outlines);
        let states: Vec<_> = task.chapters.iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            vec![
                TranslationState::Translated,
                TranslationState::Translated,
                TranslationState::Untranslated
            ]
        );

        let mut glossary = Glossary::new();
        glossary.insert("勇者".into(), "勇者".into());
        novel.replace_glossary(glossary);

        let task = plan_task(&novel, &outlines);
        assert_eq!(task.chapters[0].state, TranslationState::TranslatedAndExpired);
        assert_eq!(task.chapters[1].state, TranslationState::TranslatedAndExpired);
        assert_eq!(task.glossary_version.as_ref(), novel.glossary_version());
        assert_eq!(task.glossary.len(), 1);
    }

    #[test]
    fn test_metadata_query_round_trip() {
        let mut novel = novel();
        novel.introduction_translated = Some("简介".into());
        let task = plan_task(&novel, &[]);

        let query = task.metadata_query();
        assert_eq!(query[0], "異世界");
        assert_eq!(query.len(), 1 + task.toc.len());

        let translated: Vec<String> = query.iter().map(|s| format!("译{}", s)).collect();
        let decoded = task.decode_metadata(translated).unwrap();
        assert_eq!(decoded.title.as_deref(), Some("译異世界"));
        assert!(decoded.introduction.is_none());
        assert_eq!(decoded.toc.get("第三話").map(String::as_str), Some("译第三話"));

        assert!(task.decode_metadata(vec!["x".into()]).is_none());
    }

    #[test]
    fn test_task_json_shape() {
        let task = plan_task(&novel(), &[outline("c1", None)]);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["chapters"][0]["state"], "translated");
        assert_eq!(json["chapters"][1]["state"], "untranslated");
        assert!(json["glossaryVersion"].is_null());
        assert_eq!(json["title"], "異世界");
    }
}
