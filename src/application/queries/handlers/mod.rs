//! Query Handlers 实现

mod novel_handlers;
mod run_handlers;
mod translate_handlers;

pub use novel_handlers::*;
pub use run_handlers::*;
pub use translate_handlers::*;
