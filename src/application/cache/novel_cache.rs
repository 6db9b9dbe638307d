//! Novel Cache - 小说元数据缓存

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    NovelRepositoryPort, RepositoryError, SourceFetchError, SourceProviderPort,
};
use crate::domain::novel::{Novel, NovelKey};

/// 规划任务时元数据的默认有效期
pub const DEFAULT_METADATA_EXPIRE_MINUTES: i64 = 10;

/// 小说记录修订号冲突时的最大尝试次数
pub(crate) const NOVEL_WRITE_ATTEMPTS: usize = 5;

/// 小说元数据缓存
pub struct NovelCache {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    provider: Arc<dyn SourceProviderPort>,
}

impl NovelCache {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        provider: Arc<dyn SourceProviderPort>,
    ) -> Self {
        Self {
            novel_repo,
            provider,
        }
    }

    /// 本地查找，不触发网络
    pub async fn get(&self, key: &NovelKey) -> Result<Option<Novel>, ApplicationError> {
        Ok(self.novel_repo.find(key).await?)
    }

    /// 本地副本在 expire 内同步过则直接返回，否则回源刷新
    ///
    /// 刷新失败时：有本地副本则返回本地副本，否则返回错误
    pub async fn get_or_sync_remote(
        &self,
        key: &NovelKey,
        expire: Duration,
    ) -> Result<Novel, ApplicationError> {
        let now = Utc::now();
        let local = self.novel_repo.find(key).await?;

        if let Some(novel) = &local {
            if novel.is_fresh(expire, now) {
                return Ok(novel.clone());
            }
        }

        let remote = match self.provider.fetch_metadata(key).await {
            Ok(remote) => remote,
            Err(e) => {
                return match local {
                    Some(novel) => {
                        tracing::warn!(
                            novel = %key,
                            error = %e,
                            "Metadata refresh failed, using cached copy"
                        );
                        Ok(novel)
                    }
                    None => match e {
                        SourceFetchError::NotFound(_) => {
                            Err(ApplicationError::not_found("Novel", key))
                        }
                        other => Err(other.into()),
                    },
                };
            }
        };

        // 抓取期间本地记录可能已被其他写入更新，冲突时基于最新记录重新合并
        let mut local = local;
        for attempt in 1..=NOVEL_WRITE_ATTEMPTS {
            let mut novel = match local {
                Some(mut novel) => {
                    novel.apply_remote(
                        remote.title.clone(),
                        remote.introduction.clone(),
                        remote.toc.clone(),
                        now,
                    );
                    novel
                }
                None => Novel::new(
                    key.clone(),
                    remote.title.clone(),
                    remote.introduction.clone(),
                    remote.toc.clone(),
                ),
            };

            match self.novel_repo.save(&novel).await {
                Ok(revision) => {
                    novel.revision = revision;
                    tracing::info!(
                        novel = %key,
                        toc_len = novel.toc.len(),
                        revision,
                        "Novel metadata synced"
                    );
                    return Ok(novel);
                }
                Err(RepositoryError::Conflict(e)) => {
                    tracing::debug!(novel = %key, attempt, error = %e, "Novel changed during sync, retrying");
                    local = self.novel_repo.find(key).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApplicationError::RepositoryError(format!(
            "novel {} kept changing during sync",
            key
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{hook, Fixture};

    #[tokio::test]
    async fn test_first_access_fetches_and_saves() {
        let fixture = Fixture::new().await;
        let key = fixture.novel_key();

        let novel = fixture
            .novel_cache()
            .get_or_sync_remote(&key, Duration::minutes(10))
            .await
            .unwrap();
        assert_eq!(novel.chapter_ids(), vec!["c1", "c2", "c3"]);
        assert_eq!(fixture.provider.metadata_calls(), 1);

        // 有效期内不再回源
        fixture
            .novel_cache()
            .get_or_sync_remote(&key, Duration::minutes(10))
            .await
            .unwrap();
        assert_eq!(fixture.provider.metadata_calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_falls_back_to_cache() {
        let fixture = Fixture::new().await;
        let key = fixture.novel_key();
        fixture
            .novel_cache()
            .get_or_sync_remote(&key, Duration::minutes(10))
            .await
            .unwrap();

        fixture.provider.fail_metadata(true);
        let novel = fixture
            .novel_cache()
            .get_or_sync_remote(&key, Duration::zero())
            .await
            .unwrap();
        assert_eq!(novel.title_src, "異世界転生");
        assert_eq!(fixture.provider.metadata_calls(), 2);
    }

    #[tokio::test]
    async fn test_sync_merges_onto_concurrent_write() {
        let fixture = Fixture::new().await;
        let key = fixture.novel_key();
        let synced = fixture.sync_novel().await;
        assert_eq!(synced.revision, 1);

        // 抓取期间另一个任务上传了目录译文
        let repo = fixture.novel_repo.clone();
        let mut translated = synced.clone();
        translated.toc[1].title_translated = Some("第一话".into());
        fixture.provider.before_next_metadata(hook(move || {
            let repo = repo.clone();
            let translated = translated.clone();
            async move {
                repo.update_translated_metadata(&translated).await.unwrap();
            }
        }));

        let novel = fixture
            .novel_cache()
            .get_or_sync_remote(&key, Duration::zero())
            .await
            .unwrap();
        assert_eq!(novel.toc[1].title_translated.as_deref(), Some("第一话"));
        assert_eq!(novel.revision, 3);
        assert_eq!(fixture.provider.metadata_calls(), 2);

        let stored = fixture.novel_repo.find(&key).await.unwrap().unwrap();
        assert_eq!(stored.toc[1].title_translated.as_deref(), Some("第一话"));
        assert_eq!(stored.revision, 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_without_cache_is_upstream_error() {
        let fixture = Fixture::new().await;
        fixture.provider.fail_metadata(true);

        let result = fixture
            .novel_cache()
            .get_or_sync_remote(&fixture.novel_key(), Duration::minutes(10))
            .await;
        assert!(matches!(result, Err(ApplicationError::UpstreamFetch(_))));
    }
}
