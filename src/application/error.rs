//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{
    ChapterWriteError, FileArtifactError, RenderError, RepositoryError, RunError,
    SourceFetchError, TranslatorCreateError,
};
use crate::domain::novel::NovelError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 源站不可达或解析失败
    #[error("Upstream fetch error: {0}")]
    UpstreamFetch(String),

    /// 译文段落数与源段落数不一致
    #[error("翻译文本长度不匹配: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// 写入时携带的术语表版本已过期
    #[error("术语表uuid失效")]
    GlossaryStale,

    /// 翻译器凭证或配置错误
    #[error("Translator backend error: {0}")]
    TranslatorBackend(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

impl From<NovelError> for ApplicationError {
    fn from(err: NovelError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<SourceFetchError> for ApplicationError {
    fn from(err: SourceFetchError) -> Self {
        Self::UpstreamFetch(err.to_string())
    }
}

impl From<ChapterWriteError> for ApplicationError {
    fn from(err: ChapterWriteError) -> Self {
        match err {
            ChapterWriteError::NotFound(id) => Self::NotFound {
                resource_type: "Chapter",
                id,
            },
            ChapterWriteError::LengthMismatch { expected, actual } => {
                Self::LengthMismatch { expected, actual }
            }
            ChapterWriteError::Repository(e) => Self::RepositoryError(e.to_string()),
        }
    }
}

impl From<TranslatorCreateError> for ApplicationError {
    fn from(err: TranslatorCreateError) -> Self {
        Self::TranslatorBackend(err.to_string())
    }
}

impl From<FileArtifactError> for ApplicationError {
    fn from(err: FileArtifactError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<RenderError> for ApplicationError {
    fn from(err: RenderError) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<RunError> for ApplicationError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::NotFound(id) => Self::NotFound {
                resource_type: "Run",
                id,
            },
            RunError::QueueFull => Self::InternalError(err.to_string()),
        }
    }
}
