//! 百度通用翻译 API
//!
//! POST {endpoint}  (application/x-www-form-urlencoded)
//! q 为换行拼接的多段文本，sign = md5(appid + q + salt + key)

use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use super::ChunkBudget;
use crate::application::ports::TranslatorError;

/// 单次请求 q 不超过 6000 字节，按字符保守估计
pub(super) const BUDGET: ChunkBudget = ChunkBudget {
    max_chars: 1800,
    max_items: 200,
};

/// 凭证失效、签名错误、余额不足、服务已关闭
const ABORT_CODES: [&str; 4] = ["52003", "54001", "54004", "58002"];

#[derive(Debug, Clone)]
pub struct BaiduConfig {
    pub app_id: String,
    pub app_key: String,
    pub endpoint: String,
}

impl Default for BaiduConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_key: String::new(),
            endpoint: "https://fanyi-api.baidu.com/api/trans/vip/translate".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransResult {
    dst: String,
}

#[derive(Debug, Deserialize)]
struct BaiduResponse {
    error_code: Option<String>,
    error_msg: Option<String>,
    trans_result: Option<Vec<TransResult>>,
}

pub(super) fn sign(app_id: &str, query: &str, salt: &str, app_key: &str) -> String {
    format!(
        "{:x}",
        md5::compute(format!("{}{}{}{}", app_id, query, salt, app_key).as_bytes())
    )
}

fn classify(code: &str, message: &str) -> TranslatorError {
    let message = format!("百度翻译错误 {}: {}", code, message);
    if ABORT_CODES.contains(&code) {
        TranslatorError::Abort(message)
    } else {
        TranslatorError::Skip(message)
    }
}

pub struct BaiduTranslator {
    client: Client,
    config: BaiduConfig,
}

impl BaiduTranslator {
    pub fn new(client: Client, config: BaiduConfig) -> Self {
        Self { client, config }
    }

    pub(super) async fn translate_chunk(&self, chunk: &[String]) -> Result<Vec<String>, TranslatorError> {
        // 段落内的换行会打乱按行对齐，先替换为空格
        let query = chunk
            .iter()
            .map(|text| text.replace(['\r', '\n'], " "))
            .collect::<Vec<_>>()
            .join("\n");
        let salt = Uuid::new_v4().simple().to_string();
        let sign = sign(&self.config.app_id, &query, &salt, &self.config.app_key);

        let params = [
            ("q", query.as_str()),
            ("from", "jp"),
            ("to", "zh"),
            ("appid", self.config.app_id.as_str()),
            ("salt", salt.as_str()),
            ("sign", sign.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| TranslatorError::Skip(format!("百度翻译请求失败: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslatorError::Skip(format!("百度翻译 HTTP {}", status)));
        }

        let body: BaiduResponse = response
            .json()
            .await
            .map_err(|e| TranslatorError::Skip(format!("百度翻译响应无法解析: {}", e)))?;

        if let Some(code) = body.error_code.filter(|c| c != "52000") {
            return Err(classify(&code, body.error_msg.as_deref().unwrap_or_default()));
        }

        let results = body
            .trans_result
            .ok_or_else(|| TranslatorError::Skip("百度翻译响应缺少 trans_result".to_string()))?;
        Ok(results.into_iter().map(|r| r.dst).collect())
    }
}
