//! Memory Layer - In-Memory State Management
//!
//! 实现 RunManager，管理后台翻译任务的内存状态

mod run_manager;

pub use run_manager::{InMemoryRunManager, DEFAULT_RUN_RETENTION_MINUTES};
