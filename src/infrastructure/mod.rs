//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod events;
pub mod http;
pub mod memory;
pub mod persistence;
pub mod worker;

pub use events::{EventProgressSink, EventPublisher};
pub use memory::InMemoryRunManager;
pub use persistence::{SledChapterRepository, SqliteNovelRepository};
pub use worker::{TranslateWorker, TranslateWorkerConfig};
