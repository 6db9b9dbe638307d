//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod file_commands;
mod run_commands;
mod translate_commands;

pub mod handlers;

pub use file_commands::*;
pub use run_commands::*;
pub use translate_commands::*;
