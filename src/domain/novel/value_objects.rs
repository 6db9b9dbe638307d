//! Novel Context - Value Objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::NovelError;

/// 小说家になろう 的 provider id，其 novel id 必须为小写
pub const SYOSETU_PROVIDER_ID: &str = "syosetu";

fn validate_segment(kind: &'static str, value: &str) -> Result<(), NovelError> {
    if value.is_empty() {
        return Err(NovelError::InvalidKey(format!("{} 不能为空", kind)));
    }
    if value.contains(':') || value.contains('/') {
        return Err(NovelError::InvalidKey(format!(
            "{} 不能包含 ':' 或 '/': {}",
            kind, value
        )));
    }
    Ok(())
}

/// 小说唯一标识 (providerId, novelId)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NovelKey {
    provider_id: String,
    novel_id: String,
}

impl NovelKey {
    pub fn new(
        provider_id: impl Into<String>,
        novel_id: impl Into<String>,
    ) -> Result<Self, NovelError> {
        let provider_id = provider_id.into();
        let novel_id = novel_id.into();
        validate_segment("providerId", &provider_id)?;
        validate_segment("novelId", &novel_id)?;
        if provider_id == SYOSETU_PROVIDER_ID && novel_id != novel_id.to_lowercase() {
            return Err(NovelError::InvalidKey(
                "成为小说家id应当小写".to_string(),
            ));
        }
        Ok(Self {
            provider_id,
            novel_id,
        })
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn novel_id(&self) -> &str {
        &self.novel_id
    }

    pub fn chapter(&self, chapter_id: impl Into<String>) -> Result<ChapterKey, NovelError> {
        ChapterKey::new(self.clone(), chapter_id)
    }
}

impl std::fmt::Display for NovelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider_id, self.novel_id)
    }
}

/// 章节唯一标识 (providerId, novelId, chapterId)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterKey {
    novel: NovelKey,
    chapter_id: String,
}

impl ChapterKey {
    pub fn new(novel: NovelKey, chapter_id: impl Into<String>) -> Result<Self, NovelError> {
        let chapter_id = chapter_id.into();
        validate_segment("chapterId", &chapter_id)?;
        Ok(Self { novel, chapter_id })
    }

    pub fn novel(&self) -> &NovelKey {
        &self.novel
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }
}

impl std::fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.novel, self.chapter_id)
    }
}

/// 术语表：源语言术语 -> 译文术语
///
/// 使用 BTreeMap 保证遍历顺序稳定
pub type Glossary = BTreeMap<String, String>;

/// 术语表版本标识，每次编辑术语表都会重新生成
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlossaryVersion(String);

impl GlossaryVersion {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GlossaryVersion {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for GlossaryVersion {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for GlossaryVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 带版本的术语表
///
/// 不变量: version 为空当且仅当术语表为空
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionedGlossary {
    map: Glossary,
    version: Option<GlossaryVersion>,
}

impl VersionedGlossary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 以新版本号创建术语表
    pub fn new(map: Glossary) -> Self {
        let version = if map.is_empty() {
            None
        } else {
            Some(GlossaryVersion::generate())
        };
        Self { map, version }
    }

    /// 从存储恢复，校验不变量
    pub fn restore(map: Glossary, version: Option<GlossaryVersion>) -> Result<Self, NovelError> {
        if map.is_empty() != version.is_none() {
            return Err(NovelError::InvalidGlossary(format!(
                "glossary size {} does not match version {:?}",
                map.len(),
                version
            )));
        }
        Ok(Self { map, version })
    }

    pub fn map(&self) -> &Glossary {
        &self.map
    }

    pub fn version(&self) -> Option<&GlossaryVersion> {
        self.version.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_novel_key_validation() {
        assert!(NovelKey::new("kakuyomu", "1177354054892").is_ok());
        assert!(NovelKey::new("", "n1").is_err());
        assert!(NovelKey::new("kakuyomu", "a:b").is_err());
        assert!(NovelKey::new("syosetu", "N9669BK").is_err());
        assert!(NovelKey::new("syosetu", "n9669bk").is_ok());
    }

    #[test]
    fn test_chapter_key_display() {
        let key = NovelKey::new("pixiv", "s123").unwrap().chapter("42").unwrap();
        assert_eq!(key.to_string(), "pixiv/s123/42");
        assert!(NovelKey::new("pixiv", "s123").unwrap().chapter("a/b").is_err());
    }

    #[test]
    fn test_versioned_glossary_invariant() {
        let empty = VersionedGlossary::new(Glossary::new());
        assert!(empty.version().is_none());

        let mut map = Glossary::new();
        map.insert("勇者".to_string(), "勇者".to_string());
        let glossary = VersionedGlossary::new(map.clone());
        assert!(glossary.version().is_some());

        // 每次编辑都生成新版本
        let again = VersionedGlossary::new(map.clone());
        assert_ne!(glossary.version(), again.version());

        assert!(VersionedGlossary::restore(map, None).is_err());
        assert!(VersionedGlossary::restore(Glossary::new(), Some("v".into())).is_err());
    }
}
