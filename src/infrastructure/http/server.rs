//! HTTP Server

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 章节译文上传的请求体上限
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers(Any)
        .max_age(Duration::from_secs(3600))
}

/// 构建带中间件的 Router
pub fn build_router(state: Arc<AppState>) -> Router {
    create_routes()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(error_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// HTTP 服务器
pub struct HttpServer {
    addr: String,
    router: Router,
}

impl HttpServer {
    pub fn new(addr: impl Into<String>, state: AppState) -> Self {
        Self {
            addr: addr.into(),
            router: build_router(Arc::new(state)),
        }
    }

    /// 监听直到 shutdown 完成，随后等待进行中的请求结束
    pub async fn serve_until<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
