//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod file_handlers;
mod run_handlers;
mod translate_handlers;

pub use file_handlers::*;
pub use run_handlers::*;
pub use translate_handlers::*;
