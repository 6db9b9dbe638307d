//! 翻译器标识
//!
//! 翻译后端是封闭集合（百度 / 有道 / GPT），不是可扩展插件

use serde::{Deserialize, Serialize};

/// 翻译器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorId {
    Baidu,
    Youdao,
    Gpt,
}

impl TranslatorId {
    pub const ALL: [TranslatorId; 3] = [TranslatorId::Baidu, TranslatorId::Youdao, TranslatorId::Gpt];

    pub fn as_str(&self) -> &'static str {
        match self {
            TranslatorId::Baidu => "baidu",
            TranslatorId::Youdao => "youdao",
            TranslatorId::Gpt => "gpt",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "baidu" => Some(TranslatorId::Baidu),
            "youdao" => Some(TranslatorId::Youdao),
            "gpt" => Some(TranslatorId::Gpt),
            _ => None,
        }
    }
}

impl std::fmt::Display for TranslatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translator_id_str() {
        for id in TranslatorId::ALL {
            assert_eq!(TranslatorId::from_str(id.as_str()), Some(id));
        }
        assert_eq!(TranslatorId::from_str("deepl"), None);
    }

    #[test]
    fn test_translator_id_serde() {
        let json = serde_json::to_string(&TranslatorId::Youdao).unwrap();
        assert_eq!(json, "\"youdao\"");
    }
}
