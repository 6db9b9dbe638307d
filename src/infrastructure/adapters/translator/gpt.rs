//! OpenAI 兼容的 Chat Completions 接口
//!
//! 段落以 "#n:" 编号后整体发送，译文按编号解析回对应位置。
//! 术语表写入系统提示词，不在源文本上替换。

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ChunkBudget;
use crate::application::ports::TranslatorError;
use crate::domain::novel::Glossary;

pub(super) const BUDGET: ChunkBudget = ChunkBudget {
    max_chars: 1500,
    max_items: 60,
};

#[derive(Debug, Clone)]
pub struct GptConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl Default for GptConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

pub(super) fn system_prompt(glossary: &Glossary) -> String {
    let mut prompt = String::from(
        "请你作为一个轻小说翻译者，将下面的日文轻小说翻译成简体中文。\
         每行以 #编号: 开头，翻译时保留编号与行数，不要合并或拆分行，不要添加解释。",
    );
    if !glossary.is_empty() {
        prompt.push_str("\n翻译时使用以下术语表：");
        for (source, target) in glossary {
            prompt.push_str(&format!("\n{} => {}", source, target));
        }
    }
    prompt
}

pub(super) fn number_lines(chunk: &[String]) -> String {
    chunk
        .iter()
        .enumerate()
        .map(|(index, text)| format!("#{}:{}", index + 1, text.replace(['\r', '\n'], " ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 解析 "#n:" 编号行，编号缺失或重复时返回 None
pub(super) fn parse_numbered(content: &str, expected: usize) -> Option<Vec<String>> {
    let mut lines = BTreeMap::new();
    for line in content.lines() {
        let Some(rest) = line.trim().strip_prefix('#') else {
            continue;
        };
        let Some((number, text)) = rest.split_once([':', '：']) else {
            continue;
        };
        let Ok(number) = number.trim().parse::<usize>() else {
            continue;
        };
        if lines.insert(number, text.trim().to_string()).is_some() {
            return None;
        }
    }
    if lines.len() != expected || lines.keys().copied().ne(1..=expected) {
        return None;
    }
    Some(lines.into_values().collect())
}

pub struct GptTranslator {
    client: Client,
    config: GptConfig,
    glossary: Glossary,
}

impl GptTranslator {
    pub fn new(client: Client, config: GptConfig, glossary: Glossary) -> Self {
        Self {
            client,
            config,
            glossary,
        }
    }

    pub(super) async fn translate_chunk(&self, chunk: &[String]) -> Result<Vec<String>, TranslatorError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(&self.glossary),
                },
                ChatMessage {
                    role: "user",
                    content: number_lines(chunk),
                },
            ],
            temperature: 0.3,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslatorError::Skip(format!("GPT 请求失败: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.ok();
            let message = body
                .as_ref()
                .map(|b| b.error.message.clone())
                .unwrap_or_default();
            let quota = body
                .as_ref()
                .and_then(|b| b.error.code.as_deref())
                .map_or(false, |code| code == "insufficient_quota");
            let message = format!("GPT HTTP {}: {}", status, message);
            return Err(if status == StatusCode::UNAUTHORIZED || quota {
                TranslatorError::Abort(message)
            } else {
                TranslatorError::Skip(message)
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| TranslatorError::Skip(format!("GPT 响应无法解析: {}", e)))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TranslatorError::Skip("GPT 响应为空".to_string()))?;

        parse_numbered(&content, chunk.len())
            .ok_or_else(|| TranslatorError::Skip("GPT 译文编号与原文不一致".to_string()))
    }
}
