//! Translator Backends - 百度 / 有道 / GPT
//!
//! 三个后端是封闭集合，由 TranslatorBackend 分发。
//! BackendTranslator 负责所有后端共用的流程：
//! - 术语表替换（百度、有道）或写入提示词（GPT）
//! - 空白段落不送翻译，按原位置还原
//! - 按后端预算切分批次
//! - 请求间隔限速

mod baidu;
mod gpt;
mod youdao;

pub use baidu::{BaiduConfig, BaiduTranslator};
pub use gpt::{GptConfig, GptTranslator};
pub use youdao::{YoudaoConfig, YoudaoTranslator};

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::application::ports::{
    TranslatorCreateError, TranslatorError, TranslatorFactoryPort, TranslatorPort,
};
use crate::domain::novel::Glossary;
use crate::domain::TranslatorId;

/// 单次请求的批次预算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBudget {
    pub max_chars: usize,
    pub max_items: usize,
}

/// 按预算切分批次，单段超出预算时独占一个批次
pub(crate) fn split_chunks(texts: &[String], budget: ChunkBudget) -> Vec<&[String]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars = 0;

    for (index, text) in texts.iter().enumerate() {
        let len = text.chars().count();
        let full = index > start && (chars + len > budget.max_chars || index - start >= budget.max_items);
        if full {
            chunks.push(&texts[start..index]);
            start = index;
            chars = 0;
        }
        chars += len;
    }
    if start < texts.len() {
        chunks.push(&texts[start..]);
    }
    chunks
}

/// 用术语表替换源文本中的术语，长词优先
pub(crate) fn apply_glossary(text: &str, glossary: &Glossary) -> String {
    let mut terms: Vec<(&String, &String)> = glossary.iter().collect();
    terms.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

    let mut result = text.to_string();
    for (source, target) in terms {
        if !source.is_empty() {
            result = result.replace(source.as_str(), target);
        }
    }
    result
}

/// 三个翻译后端
pub enum TranslatorBackend {
    Baidu(BaiduTranslator),
    Youdao(YoudaoTranslator),
    Gpt(GptTranslator),
}

impl TranslatorBackend {
    fn id(&self) -> TranslatorId {
        match self {
            TranslatorBackend::Baidu(_) => TranslatorId::Baidu,
            TranslatorBackend::Youdao(_) => TranslatorId::Youdao,
            TranslatorBackend::Gpt(_) => TranslatorId::Gpt,
        }
    }

    fn budget(&self) -> ChunkBudget {
        match self {
            TranslatorBackend::Baidu(_) => baidu::BUDGET,
            TranslatorBackend::Youdao(_) => youdao::BUDGET,
            TranslatorBackend::Gpt(_) => gpt::BUDGET,
        }
    }

    /// GPT 通过提示词处理术语表，其余后端在源文本上直接替换
    fn replaces_glossary(&self) -> bool {
        !matches!(self, TranslatorBackend::Gpt(_))
    }

    async fn translate_chunk(&self, chunk: &[String]) -> Result<Vec<String>, TranslatorError> {
        match self {
            TranslatorBackend::Baidu(t) => t.translate_chunk(chunk).await,
            TranslatorBackend::Youdao(t) => t.translate_chunk(chunk).await,
            TranslatorBackend::Gpt(t) => t.translate_chunk(chunk).await,
        }
    }
}

/// 一次翻译任务使用的翻译器实例
pub struct BackendTranslator {
    backend: TranslatorBackend,
    glossary: Glossary,
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl BackendTranslator {
    pub fn new(backend: TranslatorBackend, glossary: Glossary, interval: Duration) -> Self {
        Self {
            backend,
            glossary,
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// 距上次请求不足 interval 时等待
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl TranslatorPort for BackendTranslator {
    async fn translate(&self, texts: Vec<String>) -> Result<Vec<String>, TranslatorError> {
        let slots: Vec<usize> = texts
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(index, _)| index)
            .collect();

        let queries: Vec<String> = slots
            .iter()
            .map(|&index| {
                if self.backend.replaces_glossary() {
                    apply_glossary(&texts[index], &self.glossary)
                } else {
                    texts[index].clone()
                }
            })
            .collect();

        let mut translated = Vec::with_capacity(queries.len());
        for chunk in split_chunks(&queries, self.backend.budget()) {
            self.pace().await;
            let result = self.backend.translate_chunk(chunk).await?;
            if result.len() != chunk.len() {
                return Err(TranslatorError::Skip(format!(
                    "翻译结果数量不匹配: expected {}, got {}",
                    chunk.len(),
                    result.len()
                )));
            }
            translated.extend(result);
        }

        tracing::debug!(
            translator = %self.backend.id(),
            paragraphs = texts.len(),
            translated = translated.len(),
            "Batch translated"
        );

        let mut output = texts;
        for (index, text) in slots.into_iter().zip(translated) {
            output[index] = text;
        }
        Ok(output)
    }

    fn supports_metadata(&self) -> bool {
        !matches!(self.backend, TranslatorBackend::Gpt(_))
    }
}

/// 翻译器工厂配置
#[derive(Debug, Clone)]
pub struct TranslatorFactoryConfig {
    pub timeout: Duration,
    /// 同一翻译器实例两次请求之间的最小间隔
    pub request_interval: Duration,
    pub baidu: BaiduConfig,
    pub youdao: YoudaoConfig,
    pub gpt: GptConfig,
}

impl Default for TranslatorFactoryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            request_interval: Duration::ZERO,
            baidu: BaiduConfig::default(),
            youdao: YoudaoConfig::default(),
            gpt: GptConfig::default(),
        }
    }
}

/// 基于 HTTP 的翻译器工厂
pub struct HttpTranslatorFactory {
    client: Client,
    config: TranslatorFactoryConfig,
}

impl HttpTranslatorFactory {
    pub fn new(config: TranslatorFactoryConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

impl TranslatorFactoryPort for HttpTranslatorFactory {
    fn create(
        &self,
        translator: TranslatorId,
        glossary: Glossary,
        access_token: Option<String>,
    ) -> Result<Box<dyn TranslatorPort>, TranslatorCreateError> {
        let missing = |reason: &str| TranslatorCreateError {
            translator,
            reason: reason.to_string(),
        };

        let backend = match translator {
            TranslatorId::Baidu => {
                if self.config.baidu.app_id.is_empty() || self.config.baidu.app_key.is_empty() {
                    return Err(missing("baidu app_id / app_key not configured"));
                }
                TranslatorBackend::Baidu(BaiduTranslator::new(
                    self.client.clone(),
                    self.config.baidu.clone(),
                ))
            }
            TranslatorId::Youdao => {
                if self.config.youdao.app_key.is_empty() || self.config.youdao.app_secret.is_empty() {
                    return Err(missing("youdao app_key / app_secret not configured"));
                }
                TranslatorBackend::Youdao(YoudaoTranslator::new(
                    self.client.clone(),
                    self.config.youdao.clone(),
                ))
            }
            TranslatorId::Gpt => {
                let mut config = self.config.gpt.clone();
                if let Some(token) = access_token.filter(|t| !t.is_empty()) {
                    config.api_key = token;
                }
                if config.api_key.is_empty() {
                    return Err(missing("gpt api_key or access token required"));
                }
                TranslatorBackend::Gpt(GptTranslator::new(
                    self.client.clone(),
                    config,
                    glossary.clone(),
                ))
            }
        };

        tracing::debug!(
            translator = %translator,
            glossary_terms = glossary.len(),
            "Translator created"
        );

        Ok(Box::new(BackendTranslator::new(
            backend,
            glossary,
            self.config.request_interval,
        )))
    }
}
