//! 章节翻译状态判定
//!
//! 每次规划任务都要重新计算，不缓存：小说术语表可能独立于章节变化

use serde::{Deserialize, Serialize};

use crate::domain::novel::GlossaryVersion;

/// 章节在某个翻译器下的翻译状态（派生值，不存储）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationState {
    #[serde(rename = "untranslated")]
    Untranslated,
    #[serde(rename = "translated")]
    Translated,
    #[serde(rename = "expired")]
    TranslatedAndExpired,
}

impl TranslationState {
    /// 判定规则
    ///
    /// - 无译文: Untranslated
    /// - 译文使用的术语表版本与小说当前版本一致（包括双方都为空）: Translated
    /// - 否则: TranslatedAndExpired
    pub fn evaluate(
        translated: bool,
        stored_version: Option<&GlossaryVersion>,
        novel_version: Option<&GlossaryVersion>,
    ) -> Self {
        if !translated {
            TranslationState::Untranslated
        } else if stored_version == novel_version {
            TranslationState::Translated
        } else {
            TranslationState::TranslatedAndExpired
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationState::Untranslated => "untranslated",
            TranslationState::Translated => "translated",
            TranslationState::TranslatedAndExpired => "expired",
        }
    }

    /// 是否需要（重新）翻译
    pub fn needs_translation(&self) -> bool {
        !matches!(self, TranslationState::Translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untranslated_regardless_of_version() {
        let v = GlossaryVersion::from("v1");
        assert_eq!(
            TranslationState::evaluate(false, None, None),
            TranslationState::Untranslated
        );
        assert_eq!(
            TranslationState::evaluate(false, Some(&v), Some(&v)),
            TranslationState::Untranslated
        );
    }

    #[test]
    fn test_translated_when_versions_match() {
        let v = GlossaryVersion::from("v1");
        assert_eq!(
            TranslationState::evaluate(true, None, None),
            TranslationState::Translated
        );
        assert_eq!(
            TranslationState::evaluate(true, Some(&v), Some(&v)),
            TranslationState::Translated
        );
    }

    #[test]
    fn test_expired_when_versions_differ() {
        let v1 = GlossaryVersion::from("v1");
        let v2 = GlossaryVersion::from("v2");
        assert_eq!(
            TranslationState::evaluate(true, Some(&v1), Some(&v2)),
            TranslationState::TranslatedAndExpired
        );
        assert_eq!(
            TranslationState::evaluate(true, None, Some(&v2)),
            TranslationState::TranslatedAndExpired
        );
        assert_eq!(
            TranslationState::evaluate(true, Some(&v1), None),
            TranslationState::TranslatedAndExpired
        );
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&TranslationState::TranslatedAndExpired).unwrap();
        assert_eq!(json, "\"expired\"");
    }
}
