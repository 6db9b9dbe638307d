//! HTTP Handlers

mod file;
mod novel;
mod ping;
mod run;
mod translate;
mod websocket;

pub use file::*;
pub use novel::*;
pub use ping::*;
pub use run::*;
pub use translate::*;
pub use websocket::*;

use crate::domain::novel::{ChapterKey, NovelKey};
use crate::domain::TranslatorId;
use crate::infrastructure::http::error::ApiError;

fn novel_key(provider_id: String, novel_id: String) -> Result<NovelKey, ApiError> {
    Ok(NovelKey::new(provider_id, novel_id)?)
}

fn chapter_key(provider_id: String, novel_id: String, chapter_id: String) -> Result<ChapterKey, ApiError> {
    Ok(novel_key(provider_id, novel_id)?.chapter(chapter_id)?)
}

fn translator_id(translator: &str) -> Result<TranslatorId, ApiError> {
    TranslatorId::from_str(translator)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown translator: {}", translator)))
}
