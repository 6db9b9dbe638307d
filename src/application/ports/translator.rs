//! Translator Port - 翻译后端
//!
//! 失败分为两类：Skip 跳过当前单元继续，Abort 结束整个任务

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::novel::Glossary;
use crate::domain::TranslatorId;

/// 翻译错误
#[derive(Debug, Clone, Error)]
pub enum TranslatorError {
    /// 可恢复错误，跳过当前单元
    #[error("{0}")]
    Skip(String),

    /// 凭证失效、额度耗尽等，结束整个任务
    #[error("{0}")]
    Abort(String),
}

impl TranslatorError {
    pub fn is_abort(&self) -> bool {
        matches!(self, TranslatorError::Abort(_))
    }
}

/// Translator Port
///
/// 输入输出段落一一对应
#[async_trait]
pub trait TranslatorPort: Send + Sync {
    async fn translate(&self, texts: Vec<String>) -> Result<Vec<String>, TranslatorError>;

    /// 是否适合翻译目录等元数据
    fn supports_metadata(&self) -> bool {
        true
    }
}

/// 构造翻译器的错误（配置缺失或凭证无效）
#[derive(Debug, Error)]
#[error("Failed to create translator {translator}: {reason}")]
pub struct TranslatorCreateError {
    pub translator: TranslatorId,
    pub reason: String,
}

/// Translator Factory Port
///
/// 每次任务以术语表快照与可选 access token 构造一个翻译器实例
pub trait TranslatorFactoryPort: Send + Sync {
    fn create(
        &self,
        translator: TranslatorId,
        glossary: Glossary,
        access_token: Option<String>,
    ) -> Result<Box<dyn TranslatorPort>, TranslatorCreateError>;
}
