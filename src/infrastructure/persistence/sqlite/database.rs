//! SQLite Database - 数据库连接和迁移

use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/fanyi.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            max_connections: 5,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// WAL 允许并发读写；busy_timeout 让写锁冲突时等待而不是立即失败
const PRAGMAS: [&str; 3] = [
    "PRAGMA journal_mode=WAL",
    "PRAGMA busy_timeout=5000",
    "PRAGMA synchronous=NORMAL",
];

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    for pragma in PRAGMAS {
        sqlx::query(pragma).execute(&pool).await?;
    }

    tracing::info!(url = %config.database_url, "SQLite pool created");

    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // 小说元数据，目录与术语表以 JSON 存储
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS novels (
            provider_id TEXT NOT NULL,
            novel_id TEXT NOT NULL,
            title_src TEXT NOT NULL,
            title_translated TEXT,
            introduction_src TEXT NOT NULL,
            introduction_translated TEXT,
            toc TEXT NOT NULL DEFAULT '[]',
            glossary TEXT NOT NULL DEFAULT '{}',
            glossary_version TEXT,
            sync_at TEXT NOT NULL,
            change_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            revision INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (provider_id, novel_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_novels_change_at
        ON novels(change_at)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let config = DatabaseConfig::in_memory();
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM novels")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[test]
    fn test_database_url_from_path() {
        let config = DatabaseConfig::new("data/test.db");
        assert_eq!(config.database_url, "sqlite:data/test.db?mode=rwc");
        assert_eq!(DatabaseConfig::in_memory().max_connections, 1);
    }
}
