//! Novel HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::{chapter_key, novel_key};
use crate::application::{GetChapter, GetNovel, UpdateGlossary};
use crate::infrastructure::http::dto::{
    ApiResponse, ChapterResponse, NovelResponse, UpdateGlossaryRequest, UpdateGlossaryResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 获取小说详情（元数据过期时回源同步）
pub async fn get_novel(
    State(state): State<Arc<AppState>>,
    Path((provider_id, novel_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<NovelResponse>>, ApiError> {
    let novel = novel_key(provider_id, novel_id)?;
    let detail = state.get_novel_handler.handle(GetNovel { novel }).await?;
    Ok(Json(ApiResponse::success(detail.into())))
}

/// 获取章节阅读视图
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Path((provider_id, novel_id, chapter_id)): Path<(String, String, String)>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let chapter = chapter_key(provider_id, novel_id, chapter_id)?;
    let detail = state.get_chapter_handler.handle(GetChapter { chapter }).await?;
    Ok(Json(ApiResponse::success(detail.into())))
}

/// 编辑术语表
pub async fn update_glossary(
    State(state): State<Arc<AppState>>,
    Path((provider_id, novel_id)): Path<(String, String)>,
    Json(req): Json<UpdateGlossaryRequest>,
) -> Result<Json<ApiResponse<UpdateGlossaryResponse>>, ApiError> {
    let novel = novel_key(provider_id, novel_id)?;
    let glossary_version = state
        .update_glossary_handler
        .handle(UpdateGlossary {
            novel,
            glossary: req.glossary,
        })
        .await?;
    Ok(Json(ApiResponse::success(UpdateGlossaryResponse {
        glossary_version,
    })))
}
