//! # 网络模块
//!
//! - `session` - 页面下载会话

pub mod session;

pub use session::Session;
