//! Events - 翻译任务事件推送

mod progress_sink;
mod publisher;

pub use progress_sink::EventProgressSink;
pub use publisher::{EventPublisher, WsEvent};
