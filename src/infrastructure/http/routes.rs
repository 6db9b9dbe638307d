//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                                                       GET   健康检查
//! - /api/novel/:provider/:novel                                     GET   小说详情
//! - /api/novel/:provider/:novel/chapter/:chapter                    GET   章节阅读视图
//! - /api/novel/:provider/:novel/glossary                            PUT   编辑术语表
//! - /api/novel/:provider/:novel/translate/:translator               GET   获取翻译任务
//! - /api/novel/:provider/:novel/translate/:translator/metadata      POST  上传元数据译文
//! - /api/novel/:provider/:novel/translate/:translator/check-chapter/:chapter  POST  检查章节
//! - /api/novel/:provider/:novel/translate/:translator/chapter/:chapter        PUT   上传章节译文
//! - /api/novel/:provider/:novel/translate/:translator/run           POST  提交后台翻译任务
//! - /api/novel/:provider/:novel/file/:lang/:type                    GET   下载 EPUB / TXT
//! - /api/run/:run_id                                                GET   任务状态
//! - /ws/run/:run_id                                                 WS    任务日志与进度

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/run/:run_id", get(handlers::run_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/novel", novel_routes())
        .route("/run/:run_id", get(handlers::get_translate_run))
}

/// Novel 路由
fn novel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:provider_id/:novel_id", get(handlers::get_novel))
        .route(
            "/:provider_id/:novel_id/chapter/:chapter_id",
            get(handlers::get_chapter),
        )
        .route(
            "/:provider_id/:novel_id/glossary",
            put(handlers::update_glossary),
        )
        .route(
            "/:provider_id/:novel_id/file/:lang/:file_type",
            get(handlers::download_file),
        )
        .route(
            "/:provider_id/:novel_id/translate/:translator",
            get(handlers::get_translate_task),
        )
        .route(
            "/:provider_id/:novel_id/translate/:translator/metadata",
            post(handlers::update_metadata_translation),
        )
        .route(
            "/:provider_id/:novel_id/translate/:translator/check-chapter/:chapter_id",
            post(handlers::check_chapter),
        )
        .route(
            "/:provider_id/:novel_id/translate/:translator/chapter/:chapter_id",
            put(handlers::update_chapter_translation),
        )
        .route(
            "/:provider_id/:novel_id/translate/:translator/run",
            post(handlers::submit_translate_run),
        )
}
