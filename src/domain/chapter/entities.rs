//! Chapter Context - Entities

use serde::{Deserialize, Serialize};

use super::TranslationState;
use crate::domain::novel::{ChapterKey, Glossary, GlossaryVersion};
use crate::domain::TranslatorId;

/// 某个翻译器产出的章节译文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterTranslation {
    pub paragraphs: Vec<String>,
    /// 产生译文时生效的术语表版本
    pub glossary_version: Option<GlossaryVersion>,
    /// 产生译文时的术语表快照
    pub glossary: Glossary,
}

/// 缓存的章节
///
/// 源段落在首次抓取后不可变（强制同步除外）；
/// 译文按翻译器分别存储，以 chapterId 为键，重新同步后保留。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub key: ChapterKey,
    pub paragraphs: Vec<String>,
    pub baidu: Option<ChapterTranslation>,
    pub youdao: Option<ChapterTranslation>,
    pub gpt: Option<ChapterTranslation>,
}

impl Chapter {
    pub fn new(key: ChapterKey, paragraphs: Vec<String>) -> Self {
        Self {
            key,
            paragraphs,
            baidu: None,
            youdao: None,
            gpt: None,
        }
    }

    pub fn translation(&self, translator: TranslatorId) -> Option<&ChapterTranslation> {
        match translator {
            TranslatorId::Baidu => self.baidu.as_ref(),
            TranslatorId::Youdao => self.youdao.as_ref(),
            TranslatorId::Gpt => self.gpt.as_ref(),
        }
    }

    pub fn set_translation(&mut self, translator: TranslatorId, translation: ChapterTranslation) {
        let slot = match translator {
            TranslatorId::Baidu => &mut self.baidu,
            TranslatorId::Youdao => &mut self.youdao,
            TranslatorId::Gpt => &mut self.gpt,
        };
        *slot = Some(translation);
    }

    /// 替换源段落，保留已有译文
    pub fn replace_source(&mut self, paragraphs: Vec<String>) {
        self.paragraphs = paragraphs;
    }

    /// 当前章节在指定翻译器下的状态
    pub fn state_for(
        &self,
        translator: TranslatorId,
        novel_version: Option<&GlossaryVersion>,
    ) -> TranslationState {
        let translation = self.translation(translator);
        TranslationState::evaluate(
            translation.is_some(),
            translation.and_then(|t| t.glossary_version.as_ref()),
            novel_version,
        )
    }
}

/// 章节翻译概要（规划任务时使用，不含段落）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterTranslationOutline {
    pub chapter_id: String,
    pub translated: bool,
    pub glossary_version: Option<GlossaryVersion>,
}

impl ChapterTranslationOutline {
    pub fn of(chapter: &Chapter, translator: TranslatorId) -> Self {
        let translation = chapter.translation(translator);
        Self {
            chapter_id: chapter.key.chapter_id().to_string(),
            translated: translation.is_some(),
            glossary_version: translation.and_then(|t| t.glossary_version.clone()),
        }
    }

    pub fn state(&self, novel_version: Option<&GlossaryVersion>) -> TranslationState {
        TranslationState::evaluate(self.translated, self.glossary_version.as_ref(), novel_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::novel::NovelKey;

    fn chapter() -> Chapter {
        let key = NovelKey::new("kakuyomu", "1").unwrap().chapter("c1").unwrap();
        Chapter::new(key, vec!["一".into(), "二".into()])
    }

    #[test]
    fn test_state_per_translator() {
        let mut chapter = chapter();
        let v1 = GlossaryVersion::from("v1");
        chapter.set_translation(
            TranslatorId::Baidu,
            ChapterTranslation {
                paragraphs: vec!["1".into(), "2".into()],
                glossary_version: Some(v1.clone()),
                glossary: Glossary::new(),
            },
        );

        assert_eq!(
            chapter.state_for(TranslatorId::Baidu, Some(&v1)),
            TranslationState::Translated
        );
        assert_eq!(
            chapter.state_for(TranslatorId::Youdao, Some(&v1)),
            TranslationState::Untranslated
        );
        assert_eq!(
            chapter.state_for(TranslatorId::Baidu, Some(&GlossaryVersion::from("v2"))),
            TranslationState::TranslatedAndExpired
        );
    }

    #[test]
    fn test_replace_source_keeps_translations() {
        let mut chapter = chapter();
        chapter.set_translation(
            TranslatorId::Gpt,
            ChapterTranslation {
                paragraphs: vec!["1".into(), "2".into()],
                glossary_version: None,
                glossary: Glossary::new(),
            },
        );
        chapter.replace_source(vec!["新".into(), "二".into()]);
        assert!(chapter.gpt.is_some());
        assert_eq!(chapter.paragraphs[0], "新");

        let outline = ChapterTranslationOutline::of(&chapter, TranslatorId::Gpt);
        assert_eq!(outline.state(None), TranslationState::Translated);
    }
}
