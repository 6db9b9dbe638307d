//! SQLite Novel Repository

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{NovelRepositoryPort, RepositoryError};
use crate::domain::novel::{
    Glossary, GlossaryVersion, Novel, NovelKey, TocEntry, VersionedGlossary,
};

/// SQLite Novel Repository
pub struct SqliteNovelRepository {
    pool: DbPool,
}

impl SqliteNovelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NovelRow {
    provider_id: String,
    novel_id: String,
    title_src: String,
    title_translated: Option<String>,
    introduction_src: String,
    introduction_translated: Option<String>,
    toc: String,
    glossary: String,
    glossary_version: Option<String>,
    sync_at: String,
    change_at: String,
    created_at: String,
    revision: i64,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// 定宽格式，SQL 中按字符串比较即按时间比较
fn format_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

impl TryFrom<NovelRow> for Novel {
    type Error = RepositoryError;

    fn try_from(row: NovelRow) -> Result<Self, Self::Error> {
        let key = NovelKey::new(row.provider_id, row.novel_id)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        let toc: Vec<TocEntry> = serde_json::from_str(&row.toc)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        let glossary: Glossary = serde_json::from_str(&row.glossary)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        let glossary =
            VersionedGlossary::restore(glossary, row.glossary_version.map(GlossaryVersion::from))
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let mut novel = Novel::new(key, row.title_src, row.introduction_src, toc).with_glossary(glossary);
        novel.title_translated = row.title_translated;
        novel.introduction_translated = row.introduction_translated;
        novel.sync_at = parse_time(&row.sync_at)?;
        novel.change_at = parse_time(&row.change_at)?;
        novel.created_at = parse_time(&row.created_at)?;
        novel.revision = u64::try_from(row.revision)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        Ok(novel)
    }
}

impl SqliteNovelRepository {
    fn ensure_updated(key: &NovelKey, rows_affected: u64) -> Result<(), RepositoryError> {
        if rows_affected == 0 {
            return Err(RepositoryError::NotFound(key.to_string()));
        }
        Ok(())
    }

    /// 修订号约束下的更新，未命中说明已被其他写入抢先
    fn ensure_revision(novel: &Novel, rows_affected: u64) -> Result<u64, RepositoryError> {
        if rows_affected == 0 {
            return Err(RepositoryError::Conflict(format!(
                "{} at revision {}",
                novel.key, novel.revision
            )));
        }
        Ok(novel.revision + 1)
    }

    fn revision_param(novel: &Novel) -> Result<i64, RepositoryError> {
        i64::try_from(novel.revision).map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }

    async fn insert(&self, novel: &Novel) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO novels (
                provider_id, novel_id, title_src, title_translated, introduction_src,
                introduction_translated, toc, glossary, glossary_version,
                sync_at, change_at, created_at, revision
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
            ON CONFLICT(provider_id, novel_id) DO NOTHING
            "#,
        )
        .bind(novel.key.provider_id())
        .bind(novel.key.novel_id())
        .bind(&novel.title_src)
        .bind(&novel.title_translated)
        .bind(&novel.introduction_src)
        .bind(&novel.introduction_translated)
        .bind(to_json(&novel.toc)?)
        .bind(to_json(novel.glossary())?)
        .bind(novel.glossary_version().map(|v| v.as_str().to_string()))
        .bind(format_time(&novel.sync_at))
        .bind(format_time(&novel.change_at))
        .bind(format_time(&novel.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Self::ensure_revision(novel, result.rows_affected())
    }
}

#[async_trait]
impl NovelRepositoryPort for SqliteNovelRepository {
    async fn find(&self, key: &NovelKey) -> Result<Option<Novel>, RepositoryError> {
        let row: Option<NovelRow> = sqlx::query_as(
            r#"
            SELECT provider_id, novel_id, title_src, title_translated, introduction_src,
                   introduction_translated, toc, glossary, glossary_version,
                   sync_at, change_at, created_at, revision
            FROM novels WHERE provider_id = ? AND novel_id = ?
            "#,
        )
        .bind(key.provider_id())
        .bind(key.novel_id())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(Novel::try_from).transpose()
    }

    async fn save(&self, novel: &Novel) -> Result<u64, RepositoryError> {
        if novel.revision == 0 {
            return self.insert(novel).await;
        }

        let result = sqlx::query(
            r#"
            UPDATE novels SET
                title_src = ?,
                introduction_src = ?,
                toc = ?,
                sync_at = ?,
                change_at = MAX(change_at, ?),
                revision = revision + 1
            WHERE provider_id = ? AND novel_id = ? AND revision = ?
            "#,
        )
        .bind(&novel.title_src)
        .bind(&novel.introduction_src)
        .bind(to_json(&novel.toc)?)
        .bind(format_time(&novel.sync_at))
        .bind(format_time(&novel.change_at))
        .bind(novel.key.provider_id())
        .bind(novel.key.novel_id())
        .bind(Self::revision_param(novel)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Self::ensure_revision(novel, result.rows_affected())
    }

    async fn update_translated_metadata(&self, novel: &Novel) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE novels SET
                title_translated = ?,
                introduction_translated = ?,
                toc = ?,
                change_at = MAX(change_at, ?),
                revision = revision + 1
            WHERE provider_id = ? AND novel_id = ? AND revision = ?
            "#,
        )
        .bind(&novel.title_translated)
        .bind(&novel.introduction_translated)
        .bind(to_json(&novel.toc)?)
        .bind(format_time(&novel.change_at))
        .bind(novel.key.provider_id())
        .bind(novel.key.novel_id())
        .bind(Self::revision_param(novel)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Self::ensure_revision(novel, result.rows_affected())
    }

    async fn update_glossary(
        &self,
        key: &NovelKey,
        glossary: &VersionedGlossary,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE novels SET glossary = ?, glossary_version = ? WHERE provider_id = ? AND novel_id = ?",
        )
        .bind(to_json(glossary.map())?)
        .bind(glossary.version().map(|v| v.as_str().to_string()))
        .bind(key.provider_id())
        .bind(key.novel_id())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Self::ensure_updated(key, result.rows_affected())
    }

    async fn touch_change_at(
        &self,
        key: &NovelKey,
        change_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE novels SET change_at = MAX(change_at, ?) WHERE provider_id = ? AND novel_id = ?",
        )
        .bind(format_time(&change_at))
        .bind(key.provider_id())
        .bind(key.novel_id())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::debug!(novel = %key, "Novel not cached, change_at not recorded");
        }
        Ok(())
    }
}
