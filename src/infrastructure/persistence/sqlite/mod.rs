//! SQLite Persistence - 小说元数据持久化

mod database;
mod novel_repo;

pub use database::*;
pub use novel_repo::*;
