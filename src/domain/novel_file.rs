//! 可下载文件（EPUB/TXT）的值对象

use serde::{Deserialize, Serialize};

use crate::domain::novel::{NovelError, NovelKey};
use crate::domain::TranslatorId;

/// 文件语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileLang {
    /// 源语言原文
    Jp,
    /// 译文（缺译文的章节回退到原文）
    Zh(TranslatorId),
    /// 原文与译文逐段对照
    Mix(TranslatorId),
}

impl FileLang {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileLang::Jp => "jp",
            FileLang::Zh(TranslatorId::Baidu) => "zh-baidu",
            FileLang::Zh(TranslatorId::Youdao) => "zh-youdao",
            FileLang::Zh(TranslatorId::Gpt) => "zh-gpt",
            FileLang::Mix(TranslatorId::Baidu) => "mix-baidu",
            FileLang::Mix(TranslatorId::Youdao) => "mix-youdao",
            FileLang::Mix(TranslatorId::Gpt) => "mix-gpt",
        }
    }

    pub fn parse(s: &str) -> Result<Self, NovelError> {
        if s == "jp" {
            return Ok(FileLang::Jp);
        }
        let parsed = s.split_once('-').and_then(|(mode, translator)| {
            let translator = TranslatorId::from_str(translator)?;
            match mode {
                "zh" => Some(FileLang::Zh(translator)),
                "mix" => Some(FileLang::Mix(translator)),
                _ => None,
            }
        });
        parsed.ok_or_else(|| NovelError::InvalidFileFormat(format!("unknown lang: {}", s)))
    }

    pub fn translator(&self) -> Option<TranslatorId> {
        match self {
            FileLang::Jp => None,
            FileLang::Zh(t) | FileLang::Mix(t) => Some(*t),
        }
    }
}

/// 文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Epub,
    Txt,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Epub => "epub",
            FileType::Txt => "txt",
        }
    }

    pub fn parse(s: &str) -> Result<Self, NovelError> {
        match s {
            "epub" => Ok(FileType::Epub),
            "txt" => Ok(FileType::Txt),
            _ => Err(NovelError::InvalidFileFormat(format!("unknown type: {}", s))),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            FileType::Epub => "application/epub+zip",
            FileType::Txt => "text/plain; charset=utf-8",
        }
    }
}

/// 文件产物键 (providerId, novelId, lang, type)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileArtifactKey {
    pub novel: NovelKey,
    pub lang: FileLang,
    pub file_type: FileType,
}

impl FileArtifactKey {
    pub fn new(novel: NovelKey, lang: FileLang, file_type: FileType) -> Self {
        Self {
            novel,
            lang,
            file_type,
        }
    }

    /// 存储文件名: {providerId}.{novelId}.{lang}.{type}
    pub fn file_name(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.novel.provider_id(),
            self.novel.novel_id(),
            self.lang.as_str(),
            self.file_type.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_lang_parse() {
        assert_eq!(FileLang::parse("jp").unwrap(), FileLang::Jp);
        assert_eq!(
            FileLang::parse("zh-gpt").unwrap(),
            FileLang::Zh(TranslatorId::Gpt)
        );
        assert_eq!(
            FileLang::parse("mix-baidu").unwrap(),
            FileLang::Mix(TranslatorId::Baidu)
        );
        assert!(FileLang::parse("zh-deepl").is_err());
        assert!(FileLang::parse("en").is_err());
        assert_eq!(FileLang::Mix(TranslatorId::Youdao).as_str(), "mix-youdao");
    }

    #[test]
    fn test_file_name() {
        let key = FileArtifactKey::new(
            NovelKey::new("syosetu", "n1234").unwrap(),
            FileLang::Zh(TranslatorId::Baidu),
            FileType::Epub,
        );
        assert_eq!(key.file_name(), "syosetu.n1234.zh-baidu.epub");
    }
}
