//! Translate Run HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::{novel_key, translator_id};
use crate::application::{GetTranslateRun, SubmitTranslateRun, TranslateRunRequest};
use crate::infrastructure::http::dto::{
    ApiResponse, RunResponse, SubmitRunRequest, SubmitRunResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 提交后台翻译任务，进度通过 /ws/run/:run_id 推送
pub async fn submit_translate_run(
    State(state): State<Arc<AppState>>,
    Path((provider_id, novel_id, translator)): Path<(String, String, String)>,
    Json(req): Json<SubmitRunRequest>,
) -> Result<Json<ApiResponse<SubmitRunResponse>>, ApiError> {
    let request = TranslateRunRequest {
        novel: novel_key(provider_id, novel_id)?,
        translator: translator_id(&translator)?,
        access_token: req.access_token,
        start_index: req.start_index,
        end_index: req.end_index.unwrap_or(usize::MAX),
        translate_expired: req.translate_expired,
        sync_from_provider: req.sync_from_provider,
    };
    let response = state
        .submit_run_handler
        .handle(SubmitTranslateRun { request })
        .await?;
    Ok(Json(ApiResponse::success(SubmitRunResponse {
        run_id: response.run_id,
    })))
}

/// 查询任务状态
pub async fn get_translate_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Json<ApiResponse<RunResponse>>, ApiError> {
    let run = state.get_run_handler.handle(GetTranslateRun { run_id }).await?;
    Ok(Json(ApiResponse::success(run.into())))
}
