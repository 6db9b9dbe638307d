//! Worker Layer - Background Task Processing
//!
//! 实现 TranslateWorker，处理后台翻译任务

mod translate_worker;

pub use translate_worker::{TranslateWorker, TranslateWorkerConfig};
