//! File Command Handlers

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::commands::MaterializeFile;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRepositoryPort, FileArtifactStoragePort, NovelFileRendererPort, NovelRepositoryPort,
};

/// 文件生成结果
#[derive(Debug, Clone)]
pub struct MaterializedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub produced_at: DateTime<Utc>,
    /// 本次是否重新生成
    pub regenerated: bool,
}

/// MaterializeFile Handler
///
/// 已有产物不早于小说 change_at 时直接复用，否则从章节缓存重新渲染（不回源）
pub struct MaterializeFileHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    storage: Arc<dyn FileArtifactStoragePort>,
    renderer: Arc<dyn NovelFileRendererPort>,
}

impl MaterializeFileHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        storage: Arc<dyn FileArtifactStoragePort>,
        renderer: Arc<dyn NovelFileRendererPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
            storage,
            renderer,
        }
    }

    pub async fn handle(&self, command: MaterializeFile) -> Result<MaterializedFile, ApplicationError> {
        let key = command.artifact;
        let novel = self
            .novel_repo
            .find(&key.novel)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", &key.novel))?;
        let file_name = key.file_name();

        if let Some(existing) = self.storage.stat(&key).await? {
            if existing.produced_at >= novel.change_at {
                tracing::debug!(file = %file_name, "File artifact cache hit");
                return Ok(MaterializedFile {
                    path: existing.path,
                    file_name,
                    produced_at: existing.produced_at,
                    regenerated: false,
                });
            }
        }

        let mut chapters = Vec::new();
        for chapter_id in novel.chapter_ids() {
            let chapter_key = novel.key.chapter(chapter_id)?;
            if let Some(chapter) = self.chapter_repo.find(&chapter_key).await? {
                chapters.push(chapter);
            }
        }

        let data = self
            .renderer
            .render(&novel, &chapters, key.lang, key.file_type)?;
        let stored = self.storage.write(&key, &data).await?;

        tracing::info!(
            file = %file_name,
            chapters = chapters.len(),
            size_bytes = data.len(),
            "File artifact generated"
        );

        Ok(MaterializedFile {
            path: stored.path,
            file_name,
            produced_at: stored.produced_at,
            regenerated: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Fixture;
    use crate::domain::novel::NovelKey;
    use crate::domain::{FileArtifactKey, FileLang, FileType, TranslatorId};

    fn command(novel: NovelKey, file_type: FileType) -> MaterializeFile {
        MaterializeFile {
            artifact: FileArtifactKey::new(novel, FileLang::Zh(TranslatorId::Baidu), file_type),
        }
    }

    #[tokio::test]
    async fn test_materialize_is_idempotent_until_change() {
        let fixture = Fixture::new().await;
        fixture.sync_novel().await;
        fixture
            .chapter_cache()
            .get_or_sync_remote(&fixture.chapter_key("c1"), false)
            .await
            .unwrap();

        let handler = fixture.materialize_handler();

        let first = handler.handle(command(fixture.novel_key(), FileType::Txt)).await.unwrap();
        assert!(first.regenerated);
        assert!(first.path.exists());
        assert_eq!(first.file_name, "kakuyomu.1.zh-baidu.txt");
        let reads = fixture.chapter_reads();

        let second = handler.handle(command(fixture.novel_key(), FileType::Txt)).await.unwrap();
        assert!(!second.regenerated);
        assert_eq!(first.path, second.path);
        assert_eq!(fixture.chapter_reads(), reads);

        // 推进 change_at 后恰好重新生成一次
        fixture.touch_novel().await;
        let third = handler.handle(command(fixture.novel_key(), FileType::Txt)).await.unwrap();
        assert!(third.regenerated);
        let fourth = handler.handle(command(fixture.novel_key(), FileType::Txt)).await.unwrap();
        assert!(!fourth.regenerated);
    }

    #[tokio::test]
    async fn test_materialize_never_syncs_remote() {
        let fixture = Fixture::new().await;
        fixture.sync_novel().await;

        let file = fixture
            .materialize_handler()
            .handle(command(fixture.novel_key(), FileType::Epub))
            .await
            .unwrap();
        assert!(file.regenerated);
        assert_eq!(fixture.provider.chapter_calls(), 0);
    }

    #[tokio::test]
    async fn test_materialize_unknown_novel() {
        let fixture = Fixture::new().await;
        let result = fixture
            .materialize_handler()
            .handle(command(NovelKey::new("kakuyomu", "404").unwrap(), FileType::Txt))
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }
}
