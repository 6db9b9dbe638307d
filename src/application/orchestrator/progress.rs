//! 进度回调

use crate::application::ports::TranslationCounters;

/// 编排进度回调
///
/// on_start 在章节循环开始前恰好调用一次（包括 total 为 0 的情况）
pub trait ProgressSink: Send + Sync {
    /// 待处理单元总数
    fn on_start(&self, total: usize);

    /// 单元成功；无需翻译时 counters 为空
    fn on_chapter_success(&self, counters: Option<TranslationCounters>);

    /// 单元失败（跳过）
    fn on_chapter_failure(&self);

    /// 人类可读日志
    fn log(&self, message: &str);
}

/// 丢弃所有回调
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_start(&self, _total: usize) {}

    fn on_chapter_success(&self, _counters: Option<TranslationCounters>) {}

    fn on_chapter_failure(&self) {}

    fn log(&self, _message: &str) {}
}
