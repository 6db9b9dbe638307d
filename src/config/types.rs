//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// 源站抓取服务
    #[serde(default)]
    pub provider: ProviderConfig,

    /// 翻译后端
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// 后台翻译任务
    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库配置（小说元数据）
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/fanyi.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// EPUB / TXT 文件目录
    #[serde(default = "default_files_dir")]
    pub files_dir: PathBuf,

    /// 章节缓存 sled 数据库路径
    #[serde(default = "default_chapter_db_path")]
    pub chapter_db_path: PathBuf,
}

fn default_files_dir() -> PathBuf {
    PathBuf::from("data/files")
}

fn default_chapter_db_path() -> PathBuf {
    PathBuf::from("data/chapters.sled")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            files_dir: default_files_dir(),
            chapter_db_path: default_chapter_db_path(),
        }
    }
}

/// 源站抓取服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,

    /// 元数据过期时间（分钟），过期后读取时回源
    #[serde(default = "default_metadata_expire")]
    pub metadata_expire_minutes: i64,
}

fn default_provider_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_provider_timeout() -> u64 {
    30
}

fn default_metadata_expire() -> i64 {
    crate::application::DEFAULT_METADATA_EXPIRE_MINUTES
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: default_provider_url(),
            timeout_secs: default_provider_timeout(),
            metadata_expire_minutes: default_metadata_expire(),
        }
    }
}

/// 翻译后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct TranslatorConfig {
    /// 单次请求超时时间（秒）
    #[serde(default = "default_translator_timeout")]
    pub timeout_secs: u64,

    /// 同一翻译器两次请求之间的最小间隔（毫秒）
    #[serde(default)]
    pub request_interval_ms: u64,

    #[serde(default)]
    pub baidu: BaiduSection,

    #[serde(default)]
    pub youdao: YoudaoSection,

    #[serde(default)]
    pub gpt: GptSection,
}

fn default_translator_timeout() -> u64 {
    60
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_translator_timeout(),
            request_interval_ms: 0,
            baidu: BaiduSection::default(),
            youdao: YoudaoSection::default(),
            gpt: GptSection::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaiduSection {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YoudaoSection {
    #[serde(default)]
    pub app_key: String,
    #[serde(default)]
    pub app_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GptSection {
    #[serde(default = "default_gpt_base_url")]
    pub base_url: String,
    #[serde(default = "default_gpt_model")]
    pub model: String,
    /// 为空时要求提交任务时携带 access token
    #[serde(default)]
    pub api_key: String,
}

fn default_gpt_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_gpt_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for GptSection {
    fn default() -> Self {
        Self {
            base_url: default_gpt_base_url(),
            model: default_gpt_model(),
            api_key: String::new(),
        }
    }
}

/// 后台翻译任务配置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// 同时执行的任务数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 排队上限
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// 已结束任务在内存中的保留时间（分钟）
    #[serde(default = "default_run_retention")]
    pub run_retention_minutes: i64,
}

fn default_max_concurrent() -> usize {
    2
}

fn default_queue_size() -> usize {
    100
}

fn default_run_retention() -> i64 {
    crate::infrastructure::memory::DEFAULT_RUN_RETENTION_MINUTES
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_size: default_queue_size(),
            run_retention_minutes: default_run_retention(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.database.database_url(), "sqlite:data/fanyi.db?mode=rwc");
        assert_eq!(config.provider.metadata_expire_minutes, 10);
        assert_eq!(config.translator.timeout_secs, 60);
        assert_eq!(config.translator.gpt.model, "gpt-3.5-turbo");
        assert_eq!(config.worker.max_concurrent, 2);
        assert_eq!(config.worker.run_retention_minutes, 60);
    }
}
