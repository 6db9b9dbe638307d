//! 有道智云批量翻译 API (v3 签名)
//!
//! POST {endpoint}  (application/x-www-form-urlencoded, q 可重复)
//! sign = sha256(appKey + input + salt + curtime + appSecret)

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::ChunkBudget;
use crate::application::ports::TranslatorError;

pub(super) const BUDGET: ChunkBudget = ChunkBudget {
    max_chars: 4000,
    max_items: 100,
};

/// 应用 ID 无效、签名错误、账户欠费
const ABORT_CODES: [&str; 3] = ["108", "202", "401"];

#[derive(Debug, Clone)]
pub struct YoudaoConfig {
    pub app_key: String,
    pub app_secret: String,
    pub endpoint: String,
}

impl Default for YoudaoConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            endpoint: "https://openapi.youdao.com/v2/api".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranslateResult {
    translation: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YoudaoResponse {
    error_code: String,
    #[serde(default)]
    translate_results: Vec<TranslateResult>,
}

/// 签名输入：长度超过 20 时取前 10 个字符 + 长度 + 后 10 个字符
pub(super) fn truncate(query: &str) -> String {
    let chars: Vec<char> = query.chars().collect();
    if chars.len() <= 20 {
        return query.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();
    format!("{}{}{}", head, chars.len(), tail)
}

pub(super) fn sign(app_key: &str, input: &str, salt: &str, curtime: &str, app_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(app_key.as_bytes());
    hasher.update(truncate(input).as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(curtime.as_bytes());
    hasher.update(app_secret.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub struct YoudaoTranslator {
    client: Client,
    config: YoudaoConfig,
}

impl YoudaoTranslator {
    pub fn new(client: Client, config: YoudaoConfig) -> Self {
        Self { client, config }
    }

    pub(super) async fn translate_chunk(&self, chunk: &[String]) -> Result<Vec<String>, TranslatorError> {
        let salt = Uuid::new_v4().to_string();
        let curtime = Utc::now().timestamp().to_string();
        let input: String = chunk.concat();
        let sign = sign(
            &self.config.app_key,
            &input,
            &salt,
            &curtime,
            &self.config.app_secret,
        );

        let mut params: Vec<(&str, &str)> = chunk.iter().map(|q| ("q", q.as_str())).collect();
        params.extend([
            ("from", "ja"),
            ("to", "zh-CHS"),
            ("appKey", self.config.app_key.as_str()),
            ("salt", salt.as_str()),
            ("sign", sign.as_str()),
            ("signType", "v3"),
            ("curtime", curtime.as_str()),
        ]);

        let response = self
            .client
            .post(&self.config.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| TranslatorError::Skip(format!("有道翻译请求失败: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslatorError::Skip(format!("有道翻译 HTTP {}", status)));
        }

        let body: YoudaoResponse = response
            .json()
            .await
            .map_err(|e| TranslatorError::Skip(format!("有道翻译响应无法解析: {}", e)))?;

        if body.error_code != "0" {
            let message = format!("有道翻译错误 {}", body.error_code);
            return Err(if ABORT_CODES.contains(&body.error_code.as_str()) {
                TranslatorError::Abort(message)
            } else {
                TranslatorError::Skip(message)
            });
        }

        Ok(body
            .translate_results
            .into_iter()
            .map(|r| r.translation)
            .collect())
    }
}
