//! Run Command Handlers

use std::sync::Arc;

use crate::application::commands::SubmitTranslateRun;
use crate::application::error::ApplicationError;
use crate::application::ports::RunManagerPort;

/// 提交响应
#[derive(Debug, Clone)]
pub struct SubmitTranslateRunResponse {
    pub run_id: String,
}

/// SubmitTranslateRun Handler
pub struct SubmitTranslateRunHandler {
    run_manager: Arc<dyn RunManagerPort>,
}

impl SubmitTranslateRunHandler {
    pub fn new(run_manager: Arc<dyn RunManagerPort>) -> Self {
        Self { run_manager }
    }

    pub async fn handle(
        &self,
        command: SubmitTranslateRun,
    ) -> Result<SubmitTranslateRunResponse, ApplicationError> {
        let request = command.request;
        if request.start_index > request.end_index {
            return Err(ApplicationError::validation(format!(
                "invalid range: [{}, {})",
                request.start_index, request.end_index
            )));
        }

        let novel = request.novel.clone();
        let translator = request.translator;
        let run_id = self.run_manager.submit(request)?;

        tracing::info!(
            run_id = %run_id,
            novel = %novel,
            translator = %translator,
            "Translate run submitted"
        );

        Ok(SubmitTranslateRunResponse { run_id })
    }
}
