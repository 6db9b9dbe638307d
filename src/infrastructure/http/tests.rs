//! 路由级测试：真实存储 + 假源站，经 oneshot 驱动完整中间件栈

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::util::ServiceExt;

use super::{build_router, AppState};
use crate::application::test_support::Fixture;
use crate::infrastructure::adapters::render::DefaultNovelFileRenderer;
use crate::infrastructure::adapters::storage::FsFileArtifactStorage;
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::memory::InMemoryRunManager;

struct TestApp {
    router: Router,
    _fixture: Fixture,
    _files: TempDir,
    _queue: mpsc::Receiver<String>,
}

impl TestApp {
    async fn new() -> Self {
        let fixture = Fixture::new().await;
        let files = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel(8);

        let state = AppState::new(
            fixture.novel_repo.clone(),
            fixture.chapter_repo.clone(),
            fixture.provider.clone(),
            Arc::new(FsFileArtifactStorage::new(files.path())),
            Arc::new(DefaultNovelFileRenderer::new()),
            InMemoryRunManager::new(tx).arc(),
            EventPublisher::new().arc(),
            Duration::minutes(10),
        );

        Self {
            router: build_router(Arc::new(state)),
            _fixture: fixture,
            _files: files,
            _queue: rx,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec(), content_type)
    }

    async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> Value {
        let (status, bytes, _) = self.send(method, uri, body).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        serde_json::from_slice(&bytes).unwrap()
    }
}

const NOVEL: &str = "/api/novel/kakuyomu/1";

#[tokio::test]
async fn test_ping() {
    let app = TestApp::new().await;
    let body = app.json(Method::GET, "/api/ping", None).await;
    assert_eq!(body["errno"], 0);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_novel_and_chapter_views() {
    let app = TestApp::new().await;

    let body = app.json(Method::GET, NOVEL, None).await;
    assert_eq!(body["data"]["titleJp"], "異世界転生");
    assert_eq!(body["data"]["toc"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"]["glossaryVersion"], Value::Null);

    let body = app.json(Method::GET, &format!("{}/chapter/c2", NOVEL), None).await;
    assert_eq!(body["data"]["prevId"], "c1");
    assert_eq!(body["data"]["nextId"], "c3");
    assert_eq!(body["data"]["paragraphs"][0], "二の一");

    let body = app.json(Method::GET, &format!("{}/chapter/c9", NOVEL), None).await;
    assert_eq!(body["errno"], 404);

    let body = app.json(Method::GET, "/api/novel/syosetu/N1", None).await;
    assert_eq!(body["errno"], 400);
}

#[tokio::test]
async fn test_translate_protocol() {
    let app = TestApp::new().await;
    let translate = format!("{}/translate/baidu", NOVEL);

    let body = app.json(Method::GET, &format!("{}/translate/deepl", NOVEL), None).await;
    assert_eq!(body["errno"], 400);

    let body = app.json(Method::GET, &translate, None).await;
    let chapters = body["data"]["chapters"].as_array().unwrap();
    assert_eq!(chapters.len(), 3);
    assert_eq!(chapters[0]["state"], "untranslated");

    let body = app
        .json(Method::POST, &format!("{}/check-chapter/c1", translate), None)
        .await;
    assert_eq!(body["data"], json!(["一の一", "一の二"]));

    let body = app
        .json(
            Method::PUT,
            &format!("{}/chapter/c1", translate),
            Some(json!({"glossaryVersion": null, "paragraphsZh": ["一之一"]})),
        )
        .await;
    assert_eq!(body["errno"], 400);

    let body = app
        .json(
            Method::PUT,
            &format!("{}/chapter/c1", translate),
            Some(json!({"glossaryVersion": null, "paragraphsZh": ["一之一", "一之二"]})),
        )
        .await;
    assert_eq!(body["data"], json!({"jp": 2, "zh": 2}));

    let body = app
        .json(
            Method::PUT,
            &format!("{}/glossary", NOVEL),
            Some(json!({"glossary": {"勇者": "勇者"}})),
        )
        .await;
    assert!(body["data"]["glossaryVersion"].is_string());

    // 旧版本术语表的译文被拒绝
    let body = app
        .json(
            Method::PUT,
            &format!("{}/chapter/c1", translate),
            Some(json!({"glossaryVersion": null, "paragraphsZh": ["一之一", "一之二"]})),
        )
        .await;
    assert_eq!(body["errno"], 409);

    let body = app.json(Method::GET, &translate, None).await;
    assert_eq!(body["data"]["chapters"][0]["state"], "expired");

    let body = app
        .json(
            Method::POST,
            &format!("{}/metadata", translate),
            Some(json!({"title": "异世界转生", "toc": {"第一話": "第一话"}})),
        )
        .await;
    assert_eq!(body["data"]["changed"], true);
}

#[tokio::test]
async fn test_file_download() {
    let app = TestApp::new().await;
    let translate = format!("{}/translate/youdao", NOVEL);

    // 获取任务时同步小说元数据
    app.json(Method::GET, &translate, None).await;
    app.json(Method::POST, &format!("{}/check-chapter/c3", translate), None)
        .await;
    app.json(
        Method::PUT,
        &format!("{}/chapter/c3", translate),
        Some(json!({"glossaryVersion": null, "paragraphsZh": ["三之一"]})),
    )
    .await;

    let (status, bytes, content_type) = app
        .send(Method::GET, &format!("{}/file/zh-youdao/txt", NOVEL), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/plain"));
    assert!(String::from_utf8(bytes).unwrap().contains("三之一"));

    let (_, bytes, _) = app
        .send(Method::GET, &format!("{}/file/zh-deepl/txt", NOVEL), None)
        .await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errno"], 400);

    let (_, bytes, _) = app
        .send(Method::GET, "/api/novel/kakuyomu/404/file/jp/epub", None)
        .await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errno"], 404);
}

#[tokio::test]
async fn test_submit_and_query_run() {
    let app = TestApp::new().await;

    let body = app
        .json(
            Method::POST,
            &format!("{}/translate/gpt/run", NOVEL),
            Some(json!({"accessToken": "sk-test", "translateExpired": true})),
        )
        .await;
    let run_id = body["data"]["runId"].as_str().unwrap().to_string();

    let body = app.json(Method::GET, &format!("/api/run/{}", run_id), None).await;
    assert_eq!(body["data"]["state"], "queued");
    assert_eq!(body["data"]["translator"], "gpt");
    assert_eq!(body["data"]["total"], Value::Null);

    let body = app.json(Method::GET, "/api/run/missing", None).await;
    assert_eq!(body["errno"], 404);

    let body = app
        .json(
            Method::POST,
            &format!("{}/translate/gpt/run", NOVEL),
            Some(json!({"startIndex": 5, "endIndex": 1})),
        )
        .await;
    assert_eq!(body["errno"], 400);
}
