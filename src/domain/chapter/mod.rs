//! Chapter Context - 章节缓存上下文
//!
//! 职责:
//! - 源段落与按翻译器划分的译文
//! - 术语表版本判定规则

mod entities;
mod state;

pub use entities::{Chapter, ChapterTranslation, ChapterTranslationOutline};
pub use state::TranslationState;
