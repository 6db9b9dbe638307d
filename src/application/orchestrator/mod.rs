//! 翻译编排
//!
//! 对一部小说顺序执行：规划 → 翻译元数据 → 逐章翻译并上传

mod progress;
mod runner;

pub use progress::{NoopProgressSink, ProgressSink};
pub use runner::{RunOutcome, RunSummary, TranslateOrchestrator, TranslateRunRequest};
