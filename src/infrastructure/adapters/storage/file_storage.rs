//! File Storage - 文件系统产物存储实现
//!
//! 实现 FileArtifactStoragePort trait
//! 路径: {base_dir}/{providerId}/{providerId}.{novelId}.{lang}.{type}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::application::ports::{FileArtifactError, FileArtifactStoragePort, StoredArtifact};
use crate::domain::FileArtifactKey;

fn io_error(e: std::io::Error) -> FileArtifactError {
    FileArtifactError::IoError(e.to_string())
}

/// 文件系统产物存储
pub struct FsFileArtifactStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FsFileArtifactStorage {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl FileArtifactStoragePort for FsFileArtifactStorage {
    fn artifact_path(&self, key: &FileArtifactKey) -> PathBuf {
        self.base_dir
            .join(key.novel.provider_id())
            .join(key.file_name())
    }

    async fn stat(&self, key: &FileArtifactKey) -> Result<Option<StoredArtifact>, FileArtifactError> {
        let path = self.artifact_path(key);
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(e)),
        };
        let modified = metadata.modified().map_err(io_error)?;

        Ok(Some(StoredArtifact {
            path,
            produced_at: DateTime::<Utc>::from(modified),
        }))
    }

    async fn write(
        &self,
        key: &FileArtifactKey,
        data: &[u8],
    ) -> Result<StoredArtifact, FileArtifactError> {
        let path = self.artifact_path(key);
        let dir = path
            .parent()
            .ok_or_else(|| FileArtifactError::IoError(format!("invalid path: {}", path.display())))?;
        fs::create_dir_all(dir).await.map_err(io_error)?;

        // 先写临时文件再 rename，读者不会看到写了一半的文件
        let temp_path = dir.join(format!(".{}.{}.tmp", key.file_name(), Uuid::new_v4()));
        let mut file = fs::File::create(&temp_path).await.map_err(io_error)?;
        file.write_all(data).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)?;

        // 显式设置 mtime，生成时间不早于触发它的 change_at
        let produced_at = SystemTime::now();
        let file = file.into_std().await;
        let result = tokio::task::spawn_blocking(move || {
            file.set_modified(produced_at)?;
            file.sync_all()
        })
        .await
        .map_err(|e| FileArtifactError::IoError(e.to_string()))?;
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_error(e));
        }

        fs::rename(&temp_path, &path).await.map_err(io_error)?;

        tracing::debug!(
            path = %path.display(),
            size = data.len(),
            "File artifact written"
        );

        Ok(StoredArtifact {
            path,
            produced_at: DateTime::<Utc>::from(produced_at),
        })
    }
}
