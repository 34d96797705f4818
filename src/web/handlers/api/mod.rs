//! API 处理器
//!
//! - `translation`: 批次翻译与整页翻译
//! - `message`: 与扩展消息格式一致的命令入口
//! - `health`: 健康检查

pub mod health;
pub mod message;
pub mod translation;

pub use health::health;
pub use message::message;
pub use translation::{translate_batch, translate_page};
