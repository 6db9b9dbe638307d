//! Novel Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NovelError {
    #[error("无效的标识: {0}")]
    InvalidKey(String),

    #[error("无效的术语表: {0}")]
    InvalidGlossary(String),

    #[error("无效的文件参数: {0}")]
    InvalidFileFormat(String),
}
