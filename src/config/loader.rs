//! Configuration Loader
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "FANYI";

/// 加载应用配置
///
/// # 环境变量示例
/// - `FANYI_SERVER__PORT=8080`
/// - `FANYI_PROVIDER__URL=http://scraper:8000`
/// - `FANYI_TRANSLATOR__BAIDU__APP_ID=2015063000000001`
/// - `FANYI_WORKER__MAX_CONCURRENT=4`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置，None 时搜索默认文件名
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    build_config(config_path, env_source())
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build_config(config_path: Option<&Path>, env: Environment) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let mut builder = Config::builder()
        .set_default("server.host", defaults.server.host)?
        .set_default("server.port", defaults.server.port)?
        .set_default("database.path", defaults.database.path)?
        .set_default("database.max_connections", defaults.database.max_connections)?
        .set_default("provider.url", defaults.provider.url)?
        .set_default("provider.timeout_secs", defaults.provider.timeout_secs)?
        .set_default(
            "provider.metadata_expire_minutes",
            defaults.provider.metadata_expire_minutes,
        )?
        .set_default("translator.timeout_secs", defaults.translator.timeout_secs)?
        .set_default(
            "translator.request_interval_ms",
            defaults.translator.request_interval_ms,
        )?
        .set_default("worker.max_concurrent", defaults.worker.max_concurrent as u64)?
        .set_default("worker.queue_size", defaults.worker.queue_size as u64)?
        .set_default(
            "worker.run_retention_minutes",
            defaults.worker.run_retention_minutes,
        )?
        .set_default("log.level", defaults.log.level)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 环境变量名会被转换为小写
    let config = builder.add_source(env).build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.server.port == 0 {
        return invalid("Server port cannot be 0");
    }
    if config.database.path.is_empty() {
        return invalid("Database path cannot be empty");
    }
    if config.provider.url.is_empty() {
        return invalid("Provider URL cannot be empty");
    }
    if config.provider.metadata_expire_minutes <= 0 {
        return invalid("Metadata expire must be positive");
    }
    if config.translator.timeout_secs == 0 {
        return invalid("Translator timeout cannot be 0");
    }
    if config.worker.max_concurrent == 0 || config.worker.queue_size == 0 {
        return invalid("Worker concurrency and queue size must be positive");
    }
    if config.worker.run_retention_minutes < 0 {
        return invalid("Run retention cannot be negative");
    }

    Ok(())
}

/// 打印配置信息（凭证只显示是否已配置）
pub fn print_config(config: &AppConfig) {
    let configured = |value: &str| if value.is_empty() { "not set" } else { "configured" };

    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Chapter Store: {:?}", config.storage.chapter_db_path);
    tracing::info!("Files Directory: {:?}", config.storage.files_dir);
    tracing::info!("Provider URL: {}", config.provider.url);
    tracing::info!(
        "Metadata Expire: {}min",
        config.provider.metadata_expire_minutes
    );
    tracing::info!(
        "Translators: baidu={}, youdao={}, gpt={} ({})",
        configured(&config.translator.baidu.app_key),
        configured(&config.translator.youdao.app_secret),
        configured(&config.translator.gpt.api_key),
        config.translator.gpt.model
    );
    tracing::info!("Worker Concurrency: {}", config.worker.max_concurrent);
    tracing::info!("Run Retention: {}min", config.worker.run_retention_minutes);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
