//! 源站适配器

mod http_source_provider;

pub use http_source_provider::{HttpSourceProvider, HttpSourceProviderConfig};
