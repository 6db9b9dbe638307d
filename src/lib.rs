//! fanyi - 网络小说翻译缓存服务
//!
//! 缓存日文网络小说的元数据与章节，协调百度 / 有道 / GPT 翻译，
//! 并按需生成 EPUB / TXT 文件。
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 小说元数据、目录、带版本的术语表
//! - Chapter Context: 章节段落、各翻译器译文、翻译状态判定
//!
//! 应用层 (application/):
//! - Ports: Repositories, SourceProvider, Translator, FileArtifact, RunManager
//! - Cache / Planner / Orchestrator
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Persistence: SQLite（小说）+ Sled（章节）
//! - Adapters: 源站客户端、翻译后端、文件渲染与存储
//! - Memory / Worker / Events: 后台翻译任务

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
