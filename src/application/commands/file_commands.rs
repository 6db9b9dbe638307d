//! File Commands

use crate::domain::FileArtifactKey;

/// 生成（或复用）可下载文件
#[derive(Debug, Clone)]
pub struct MaterializeFile {
    pub artifact: FileArtifactKey,
}
