//! Run Commands

use crate::application::orchestrator::TranslateRunRequest;

/// 提交后台翻译任务
#[derive(Debug, Clone)]
pub struct SubmitTranslateRun {
    pub request: TranslateRunRequest,
}
