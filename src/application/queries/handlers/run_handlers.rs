//! Run Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{RunManagerPort, TranslateRun};
use crate::application::queries::GetTranslateRun;

/// GetTranslateRun Handler
pub struct GetTranslateRunHandler {
    run_manager: Arc<dyn RunManagerPort>,
}

impl GetTranslateRunHandler {
    pub fn new(run_manager: Arc<dyn RunManagerPort>) -> Self {
        Self { run_manager }
    }

    pub async fn handle(&self, query: GetTranslateRun) -> Result<TranslateRun, ApplicationError> {
        self.run_manager
            .get(&query.run_id)
            .ok_or_else(|| ApplicationError::not_found("Run", &query.run_id))
    }
}
