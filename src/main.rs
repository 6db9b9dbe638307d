//! fanyi - 网络小说翻译缓存服务
//!
//! 启动顺序：配置 → 日志 → 存储 → 适配器 → Worker → HTTP

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;

use fanyi::application::{ChapterCache, NovelCache, TranslateOrchestrator};
use fanyi::config::{load_config, print_config, AppConfig};
use fanyi::infrastructure::adapters::render::DefaultNovelFileRenderer;
use fanyi::infrastructure::adapters::storage::FsFileArtifactStorage;
use fanyi::infrastructure::adapters::translator::{
    BaiduConfig, GptConfig, HttpTranslatorFactory, TranslatorFactoryConfig, YoudaoConfig,
};
use fanyi::infrastructure::adapters::{HttpSourceProvider, HttpSourceProviderConfig};
use fanyi::infrastructure::events::EventPublisher;
use fanyi::infrastructure::http::{AppState, HttpServer};
use fanyi::infrastructure::memory::InMemoryRunManager;
use fanyi::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteNovelRepository,
};
use fanyi::infrastructure::persistence::SledChapterRepository;
use fanyi::infrastructure::worker::{TranslateWorker, TranslateWorkerConfig};
use tokio::sync::mpsc;

fn translator_factory_config(config: &AppConfig) -> TranslatorFactoryConfig {
    let section = &config.translator;
    TranslatorFactoryConfig {
        timeout: Duration::from_secs(section.timeout_secs),
        request_interval: Duration::from_millis(section.request_interval_ms),
        baidu: BaiduConfig {
            app_id: section.baidu.app_id.clone(),
            app_key: section.baidu.app_key.clone(),
            ..Default::default()
        },
        youdao: YoudaoConfig {
            app_key: section.youdao.app_key.clone(),
            app_secret: section.youdao.app_secret.clone(),
            ..Default::default()
        },
        gpt: GptConfig {
            base_url: section.gpt.base_url.clone(),
            model: section.gpt.model.clone(),
            api_key: section.gpt.api_key.clone(),
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    let log_filter = format!(
        "{},fanyi={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("fanyi - 网络小说翻译缓存服务");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.files_dir).await?;
    for path in [
        std::path::Path::new(&config.database.path),
        config.storage.chapter_db_path.as_path(),
    ] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // 存储
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let novel_repo = Arc::new(SqliteNovelRepository::new(pool));
    let chapter_repo = Arc::new(SledChapterRepository::open(&config.storage.chapter_db_path)?);

    // 适配器
    let source_provider = Arc::new(HttpSourceProvider::new(HttpSourceProviderConfig {
        base_url: config.provider.url.clone(),
        timeout_secs: config.provider.timeout_secs,
    })?);
    let translator_factory = Arc::new(HttpTranslatorFactory::new(translator_factory_config(&config))?);
    let metadata_expire = ChronoDuration::minutes(config.provider.metadata_expire_minutes);

    // 后台翻译任务
    let event_publisher = EventPublisher::new().arc();
    let (run_tx, run_rx) = mpsc::channel(config.worker.queue_size);
    let run_manager = InMemoryRunManager::new(run_tx)
        .with_retention(ChronoDuration::minutes(config.worker.run_retention_minutes))
        .arc();

    let orchestrator = Arc::new(TranslateOrchestrator::new(
        novel_repo.clone(),
        chapter_repo.clone(),
        Arc::new(NovelCache::new(novel_repo.clone(), source_provider.clone())),
        Arc::new(ChapterCache::new(
            chapter_repo.clone(),
            novel_repo.clone(),
            source_provider.clone(),
        )),
        translator_factory,
        metadata_expire,
    ));

    let worker = TranslateWorker::new(
        TranslateWorkerConfig {
            max_concurrent: config.worker.max_concurrent,
        },
        run_rx,
        run_manager.clone(),
        orchestrator,
        event_publisher.clone(),
    );
    tokio::spawn(worker.run());

    // HTTP
    let state = AppState::new(
        novel_repo,
        chapter_repo.clone(),
        source_provider,
        Arc::new(FsFileArtifactStorage::new(&config.storage.files_dir)),
        Arc::new(DefaultNovelFileRenderer::new()),
        run_manager,
        event_publisher,
        metadata_expire,
    );
    HttpServer::new(config.server.addr(), state)
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    chapter_repo.flush()?;
    tracing::info!("Server shutdown complete");

    Ok(())
}
