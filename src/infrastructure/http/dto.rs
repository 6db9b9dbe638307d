//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::application::ports::{RunState, TranslateRun};
use crate::application::{ChapterDetail, NovelDetail};
use crate::domain::novel::{Glossary, GlossaryVersion, MetadataTranslation, TocEntry};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Novel DTOs
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocItemResponse {
    pub title_jp: String,
    pub title_zh: Option<String>,
    pub chapter_id: Option<String>,
}

impl From<&TocEntry> for TocItemResponse {
    fn from(entry: &TocEntry) -> Self {
        Self {
            title_jp: entry.title_src.clone(),
            title_zh: entry.title_translated.clone(),
            chapter_id: entry.chapter_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelResponse {
    pub provider_id: String,
    pub novel_id: String,
    pub title_jp: String,
    pub title_zh: Option<String>,
    pub introduction_jp: String,
    pub introduction_zh: Option<String>,
    pub toc: Vec<TocItemResponse>,
    pub glossary: Glossary,
    pub glossary_version: Option<GlossaryVersion>,
    pub jp: usize,
    pub baidu: usize,
    pub youdao: usize,
    pub gpt: usize,
    pub sync_at: String,
    pub change_at: String,
}

impl From<NovelDetail> for NovelResponse {
    fn from(detail: NovelDetail) -> Self {
        let novel = detail.novel;
        Self {
            provider_id: novel.key.provider_id().to_string(),
            novel_id: novel.key.novel_id().to_string(),
            toc: novel.toc.iter().map(TocItemResponse::from).collect(),
            glossary: novel.glossary().clone(),
            glossary_version: novel.glossary_version().cloned(),
            title_jp: novel.title_src,
            title_zh: novel.title_translated,
            introduction_jp: novel.introduction_src,
            introduction_zh: novel.introduction_translated,
            jp: detail.jp,
            baidu: detail.baidu,
            youdao: detail.youdao,
            gpt: detail.gpt,
            sync_at: novel.sync_at.to_rfc3339(),
            change_at: novel.change_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterResponse {
    pub title_jp: String,
    pub title_zh: Option<String>,
    pub prev_id: Option<String>,
    pub next_id: Option<String>,
    pub paragraphs: Vec<String>,
    pub baidu_paragraphs: Option<Vec<String>>,
    pub youdao_paragraphs: Option<Vec<String>>,
    pub gpt_paragraphs: Option<Vec<String>>,
}

impl From<ChapterDetail> for ChapterResponse {
    fn from(detail: ChapterDetail) -> Self {
        Self {
            title_jp: detail.title_src,
            title_zh: detail.title_translated,
            prev_id: detail.prev_id,
            next_id: detail.next_id,
            paragraphs: detail.paragraphs,
            baidu_paragraphs: detail.baidu,
            youdao_paragraphs: detail.youdao,
            gpt_paragraphs: detail.gpt,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateGlossaryRequest {
    pub glossary: Glossary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGlossaryResponse {
    pub glossary_version: Option<GlossaryVersion>,
}

// ============================================================================
// Translate DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MetadataTranslationRequest {
    pub title: Option<String>,
    pub introduction: Option<String>,
    #[serde(default)]
    pub toc: BTreeMap<String, String>,
}

impl From<MetadataTranslationRequest> for MetadataTranslation {
    fn from(req: MetadataTranslationRequest) -> Self {
        Self {
            title: req.title,
            introduction: req.introduction,
            toc: req.toc,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetadataTranslationResponse {
    pub changed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckChapterParams {
    #[serde(default)]
    pub sync: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChapterRequest {
    pub glossary_version: Option<GlossaryVersion>,
    pub paragraphs_zh: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRunRequest {
    pub access_token: Option<String>,
    #[serde(default)]
    pub start_index: usize,
    pub end_index: Option<usize>,
    #[serde(default)]
    pub translate_expired: bool,
    #[serde(default)]
    pub sync_from_provider: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRunResponse {
    pub run_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub run_id: String,
    pub provider_id: String,
    pub novel_id: String,
    pub translator: String,
    pub state: RunState,
    pub total: Option<usize>,
    pub succeeded: usize,
    pub failed: usize,
    pub created_at: String,
    pub finished_at: Option<String>,
}

impl From<TranslateRun> for RunResponse {
    fn from(run: TranslateRun) -> Self {
        Self {
            provider_id: run.request.novel.provider_id().to_string(),
            novel_id: run.request.novel.novel_id().to_string(),
            translator: run.request.translator.to_string(),
            run_id: run.run_id,
            state: run.state,
            total: run.total,
            succeeded: run.succeeded,
            failed: run.failed,
            created_at: run.created_at.to_rfc3339(),
            finished_at: run.finished_at.map(|t| t.to_rfc3339()),
        }
    }
}
