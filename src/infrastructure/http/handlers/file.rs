//! File Download Handler

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use super::novel_key;
use crate::application::MaterializeFile;
use crate::domain::{FileArtifactKey, FileLang, FileType};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 生成（或复用）文件并以流的形式返回
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((provider_id, novel_id, lang, file_type)): Path<(String, String, String, String)>,
) -> Result<Response, ApiError> {
    let file_type = FileType::parse(&file_type)?;
    let artifact = FileArtifactKey::new(
        novel_key(provider_id, novel_id)?,
        FileLang::parse(&lang)?,
        file_type,
    );

    let file = state
        .materialize_file_handler
        .handle(MaterializeFile { artifact })
        .await?;

    let handle = tokio::fs::File::open(&file.path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open {}: {}", file.file_name, e)))?;
    let length = handle
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file_type.content_type())
        .header(header::CONTENT_LENGTH, length)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        )
        .body(Body::from_stream(ReaderStream::new(handle)))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
