//! Translate HTTP Handlers
//!
//! 供外部翻译客户端使用的三步协议：获取任务 → 检查章节 → 上传译文

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use super::{chapter_key, novel_key, translator_id};
use crate::application::{
    CheckChapter, GetTranslateTask, TranslateTask, TranslationCounters,
    UpdateChapterTranslation, UpdateMetadataTranslation,
};
use crate::infrastructure::http::dto::{
    ApiResponse, CheckChapterParams, MetadataTranslationRequest, MetadataTranslationResponse,
    UpdateChapterRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 获取翻译任务
pub async fn get_translate_task(
    State(state): State<Arc<AppState>>,
    Path((provider_id, novel_id, translator)): Path<(String, String, String)>,
) -> Result<Json<ApiResponse<TranslateTask>>, ApiError> {
    let query = GetTranslateTask {
        novel: novel_key(provider_id, novel_id)?,
        translator: translator_id(&translator)?,
    };
    let task = state.get_translate_task_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(task)))
}

/// 上传元数据译文
pub async fn update_metadata_translation(
    State(state): State<Arc<AppState>>,
    Path((provider_id, novel_id, translator)): Path<(String, String, String)>,
    Json(req): Json<MetadataTranslationRequest>,
) -> Result<Json<ApiResponse<MetadataTranslationResponse>>, ApiError> {
    let command = UpdateMetadataTranslation {
        novel: novel_key(provider_id, novel_id)?,
        translator: translator_id(&translator)?,
        translation: req.into(),
    };
    let changed = state.update_metadata_handler.handle(command).await?;
    Ok(Json(ApiResponse::success(MetadataTranslationResponse {
        changed,
    })))
}

/// 检查章节，需要翻译时返回源段落
pub async fn check_chapter(
    State(state): State<Arc<AppState>>,
    Path((provider_id, novel_id, translator, chapter_id)): Path<(String, String, String, String)>,
    Query(params): Query<CheckChapterParams>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let query = CheckChapter {
        translator: translator_id(&translator)?,
        chapter: chapter_key(provider_id, novel_id, chapter_id)?,
        sync: params.sync,
    };
    let paragraphs = state.check_chapter_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(paragraphs)))
}

/// 上传章节译文
pub async fn update_chapter_translation(
    State(state): State<Arc<AppState>>,
    Path((provider_id, novel_id, translator, chapter_id)): Path<(String, String, String, String)>,
    Json(req): Json<UpdateChapterRequest>,
) -> Result<Json<ApiResponse<TranslationCounters>>, ApiError> {
    let command = UpdateChapterTranslation {
        translator: translator_id(&translator)?,
        chapter: chapter_key(provider_id, novel_id, chapter_id)?,
        glossary_version: req.glossary_version,
        paragraphs_zh: req.paragraphs_zh,
    };
    let counters = state.update_chapter_handler.handle(command).await?;
    Ok(Json(ApiResponse::success(counters)))
}
