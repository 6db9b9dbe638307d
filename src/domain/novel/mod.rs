//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 小说聚合（元数据、目录、术语表）
//! - 标识与术语表版本值对象

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{MetadataTranslation, Novel};
pub use entities::{merge_toc, TocEntry};
pub use errors::NovelError;
pub use value_objects::{
    ChapterKey, Glossary, GlossaryVersion, NovelKey, VersionedGlossary, SYOSETU_PROVIDER_ID,
};
