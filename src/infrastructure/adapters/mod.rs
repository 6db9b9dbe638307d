//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod provider;
pub mod render;
pub mod storage;
pub mod translator;

pub use provider::*;
pub use render::DefaultNovelFileRenderer;
pub use storage::*;
pub use translator::{HttpTranslatorFactory, TranslatorFactoryConfig};
