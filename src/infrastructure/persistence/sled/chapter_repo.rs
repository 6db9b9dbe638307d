//! Sled-based Chapter Repository
//!
//! 键格式: chapter:{providerId}:{novelId}:{chapterId}
//! 写入使用 compare_and_swap，保证译文与源段落的读改写是原子的

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::{Db, IVec};
use std::path::Path;

use crate::application::ports::{
    ChapterRepositoryPort, ChapterWriteError, RepositoryError, TranslationCounters,
};
use crate::domain::chapter::{Chapter, ChapterTranslation, ChapterTranslationOutline};
use crate::domain::novel::{ChapterKey, NovelKey};
use crate::domain::TranslatorId;

/// 内部存储条目
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChapter {
    paragraphs: Vec<String>,
    baidu: Option<ChapterTranslation>,
    youdao: Option<ChapterTranslation>,
    gpt: Option<ChapterTranslation>,
    updated_at: i64,
}

impl StoredChapter {
    fn from_chapter(chapter: Chapter) -> Self {
        Self {
            paragraphs: chapter.paragraphs,
            baidu: chapter.baidu,
            youdao: chapter.youdao,
            gpt: chapter.gpt,
            updated_at: Utc::now().timestamp(),
        }
    }

    fn into_chapter(self, key: ChapterKey) -> Chapter {
        Chapter {
            key,
            paragraphs: self.paragraphs,
            baidu: self.baidu,
            youdao: self.youdao,
            gpt: self.gpt,
        }
    }
}

fn database_error(e: sled::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

fn decode(data: &[u8]) -> Result<StoredChapter, RepositoryError> {
    bincode::deserialize(data).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

fn encode(chapter: &StoredChapter) -> Result<Vec<u8>, RepositoryError> {
    bincode::serialize(chapter).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// Sled 章节仓库
pub struct SledChapterRepository {
    db: Db,
}

impl SledChapterRepository {
    /// 打开（或创建）章节数据库
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let db = sled::open(path.as_ref()).map_err(database_error)?;
        tracing::info!(
            db_path = %path.as_ref().display(),
            chapters = db.scan_prefix("chapter:").count(),
            "SledChapterRepository initialized"
        );
        Ok(Self { db })
    }

    fn novel_prefix(novel: &NovelKey) -> String {
        format!("chapter:{}:{}:", novel.provider_id(), novel.novel_id())
    }

    fn chapter_key(key: &ChapterKey) -> String {
        format!("{}{}", Self::novel_prefix(key.novel()), key.chapter_id())
    }

    /// 遍历小说下所有章节，返回 (chapterId, 条目)
    fn scan_novel(&self, novel: &NovelKey) -> Result<Vec<(String, StoredChapter)>, RepositoryError> {
        let prefix = Self::novel_prefix(novel);
        let mut chapters = Vec::new();
        for item in self.db.scan_prefix(&prefix) {
            let (key, value) = item.map_err(database_error)?;
            let key = String::from_utf8(key.to_vec())
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
            let chapter_id = key[prefix.len()..].to_string();
            chapters.push((chapter_id, decode(&value)?));
        }
        Ok(chapters)
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), RepositoryError> {
        self.db.flush().map_err(database_error)?;
        Ok(())
    }
}

#[async_trait]
impl ChapterRepositoryPort for SledChapterRepository {
    async fn find(&self, key: &ChapterKey) -> Result<Option<Chapter>, RepositoryError> {
        match self.db.get(Self::chapter_key(key)).map_err(database_error)? {
            Some(data) => Ok(Some(decode(&data)?.into_chapter(key.clone()))),
            None => Ok(None),
        }
    }

    async fn save_source(
        &self,
        key: &ChapterKey,
        paragraphs: Vec<String>,
    ) -> Result<Chapter, RepositoryError> {
        let db_key = Self::chapter_key(key);

        loop {
            let current: Option<IVec> = self.db.get(&db_key).map_err(database_error)?;
            let stored = match &current {
                Some(data) => {
                    let mut stored = decode(data)?;
                    stored.paragraphs = paragraphs.clone();
                    stored.updated_at = Utc::now().timestamp();
                    stored
                }
                None => StoredChapter::from_chapter(Chapter::new(key.clone(), paragraphs.clone())),
            };

            let bytes = encode(&stored)?;
            match self
                .db
                .compare_and_swap(&db_key, current, Some(bytes))
                .map_err(database_error)?
            {
                Ok(()) => {
                    tracing::debug!(
                        chapter = %key,
                        paragraphs = stored.paragraphs.len(),
                        "Chapter source saved"
                    );
                    return Ok(stored.into_chapter(key.clone()));
                }
                Err(_) => {
                    tracing::debug!(chapter = %key, "Concurrent chapter write, retrying");
                }
            }
        }
    }

    async fn update_translation(
        &self,
        key: &ChapterKey,
        translator: TranslatorId,
        translation: ChapterTranslation,
    ) -> Result<Chapter, ChapterWriteError> {
        let db_key = Self::chapter_key(key);

        loop {
            let current = self
                .db
                .get(&db_key)
                .map_err(database_error)?
                .ok_or_else(|| ChapterWriteError::NotFound(key.to_string()))?;

            let mut chapter = decode(&current)?.into_chapter(key.clone());
            if translation.paragraphs.len() != chapter.paragraphs.len() {
                return Err(ChapterWriteError::LengthMismatch {
                    expected: chapter.paragraphs.len(),
                    actual: translation.paragraphs.len(),
                });
            }
            chapter.set_translation(translator, translation.clone());

            let stored = StoredChapter::from_chapter(chapter);
            let bytes = encode(&stored)?;
            match self
                .db
                .compare_and_swap(&db_key, Some(current), Some(bytes))
                .map_err(database_error)?
            {
                Ok(()) => {
                    tracing::debug!(
                        chapter = %key,
                        translator = %translator,
                        "Chapter translation saved"
                    );
                    return Ok(stored.into_chapter(key.clone()));
                }
                Err(_) => {
                    tracing::debug!(chapter = %key, "Concurrent chapter write, retrying");
                }
            }
        }
    }

    async fn translation_outlines(
        &self,
        novel: &NovelKey,
        translator: TranslatorId,
    ) -> Result<Vec<ChapterTranslationOutline>, RepositoryError> {
        let mut outlines = Vec::new();
        for (chapter_id, stored) in self.scan_novel(novel)? {
            let chapter = stored.into_chapter(
                novel
                    .chapter(chapter_id)
                    .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            );
            outlines.push(ChapterTranslationOutline::of(&chapter, translator));
        }
        Ok(outlines)
    }

    async fn paragraph_stats(
        &self,
        novel: &NovelKey,
        translator: TranslatorId,
    ) -> Result<TranslationCounters, RepositoryError> {
        let mut counters = TranslationCounters::default();
        for (_, stored) in self.scan_novel(novel)? {
            counters.jp += stored.paragraphs.len();
            let translation = match translator {
                TranslatorId::Baidu => stored.baidu.as_ref(),
                TranslatorId::Youdao => stored.youdao.as_ref(),
                TranslatorId::Gpt => stored.gpt.as_ref(),
            };
            counters.zh += translation.map_or(0, |t| t.paragraphs.len());
        }
        Ok(counters)
    }
}
