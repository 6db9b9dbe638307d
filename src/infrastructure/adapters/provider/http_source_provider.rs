//! HTTP Source Provider - 调用外部抓取服务
//!
//! 实现 SourceProviderPort trait
//!
//! 外部抓取服务 API:
//! GET {base_url}/{providerId}/{novelId}
//!   Response: {"title": "...", "introduction": "...", "toc": [{"title": "...", "chapterId": "..."}]}
//! GET {base_url}/{providerId}/{novelId}/{chapterId}
//!   Response: {"paragraphs": ["...", "..."]}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::{
    RemoteChapter, RemoteNovelMetadata, SourceFetchError, SourceProviderPort,
};
use crate::domain::novel::{ChapterKey, NovelKey, TocEntry};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TocItemResponse {
    title: String,
    chapter_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    title: String,
    #[serde(default)]
    introduction: String,
    toc: Vec<TocItemResponse>,
}

#[derive(Debug, Deserialize)]
struct ChapterResponse {
    paragraphs: Vec<String>,
}

/// 抓取服务客户端配置
#[derive(Debug, Clone)]
pub struct HttpSourceProviderConfig {
    /// 抓取服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSourceProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            timeout_secs: 30,
        }
    }
}

/// HTTP 源站客户端
pub struct HttpSourceProvider {
    client: Client,
    config: HttpSourceProviderConfig,
}

impl HttpSourceProvider {
    pub fn new(config: HttpSourceProviderConfig) -> Result<Self, SourceFetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceFetchError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn novel_url(&self, key: &NovelKey) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            key.provider_id(),
            key.novel_id()
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, resource: String) -> Result<T, SourceFetchError> {
        tracing::debug!(url = %url, "Fetching from source provider");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceFetchError::Timeout
            } else if e.is_connect() {
                SourceFetchError::NetworkError(format!("Cannot connect to source provider: {}", e))
            } else {
                SourceFetchError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceFetchError::NotFound(resource));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceFetchError::NetworkError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceFetchError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl SourceProviderPort for HttpSourceProvider {
    async fn fetch_metadata(&self, key: &NovelKey) -> Result<RemoteNovelMetadata, SourceFetchError> {
        let response: MetadataResponse = self.get_json(&self.novel_url(key), key.to_string()).await?;

        let toc = response
            .toc
            .into_iter()
            .map(|item| match item.chapter_id {
                Some(chapter_id) => TocEntry::chapter(item.title, chapter_id),
                None => TocEntry::volume(item.title),
            })
            .collect();

        Ok(RemoteNovelMetadata {
            title: response.title,
            introduction: response.introduction,
            toc,
        })
    }

    async fn fetch_chapter(&self, key: &ChapterKey) -> Result<RemoteChapter, SourceFetchError> {
        let url = format!("{}/{}", self.novel_url(key.novel()), key.chapter_id());
        let response: ChapterResponse = self.get_json(&url, key.to_string()).await?;

        Ok(RemoteChapter {
            paragraphs: response.paragraphs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn_server() -> String {
        let app = Router::new()
            .route(
                "/:provider/:novel",
                get(|Path((provider, novel)): Path<(String, String)>| async move {
                    if novel == "404" {
                        return Err(AxumStatus::NOT_FOUND);
                    }
                    Ok(Json(json!({
                        "title": format!("{}-{}", provider, novel),
                        "toc": [
                            {"title": "第一章"},
                            {"title": "第一話", "chapterId": "c1"}
                        ]
                    })))
                }),
            )
            .route(
                "/:provider/:novel/:chapter",
                get(|Path((_, _, chapter)): Path<(String, String, String)>| async move {
                    if chapter == "broken" {
                        return Json(json!({"text": "oops"}));
                    }
                    Json::<Value>(json!({"paragraphs": ["一", "", "二"]}))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base_url: String) -> HttpSourceProvider {
        HttpSourceProvider::new(HttpSourceProviderConfig {
            base_url,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_metadata() {
        let provider = provider(spawn_server().await);
        let key = NovelKey::new("kakuyomu", "1").unwrap();

        let metadata = provider.fetch_metadata(&key).await.unwrap();
        assert_eq!(metadata.title, "kakuyomu-1");
        assert_eq!(metadata.introduction, "");
        assert_eq!(metadata.toc.len(), 2);
        assert!(!metadata.toc[0].is_chapter());
        assert_eq!(metadata.toc[1].chapter_id.as_deref(), Some("c1"));

        let missing = NovelKey::new("kakuyomu", "404").unwrap();
        assert!(matches!(
            provider.fetch_metadata(&missing).await,
            Err(SourceFetchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_chapter() {
        let provider = provider(spawn_server().await);
        let novel = NovelKey::new("kakuyomu", "1").unwrap();

        let chapter = provider.fetch_chapter(&novel.chapter("c1").unwrap()).await.unwrap();
        assert_eq!(chapter.paragraphs, vec!["一", "", "二"]);

        let broken = provider.fetch_chapter(&novel.chapter("broken").unwrap()).await;
        assert!(matches!(broken, Err(SourceFetchError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        let provider = provider("http://127.0.0.1:1".to_string());
        let key = NovelKey::new("kakuyomu", "1").unwrap();
        assert!(matches!(
            provider.fetch_metadata(&key).await,
            Err(SourceFetchError::NetworkError(_))
        ));
    }
}
