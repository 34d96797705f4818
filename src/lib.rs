//! # Mazegaki Library
//!
//! 把网页中按比例抽取的日语文本替换为英文译文，生成日英混排的页面。
//!
//! ## 模块组织
//!
//! - `core` - 文档载入、翻译与输出
//! - `env` - 类型安全的环境变量
//! - `parsers` - HTML 与内联样式解析
//! - `network` - 页面下载
//! - `utils` - 工具函数
//! - `translation` - 文本收集、批次翻译与运行驱动
//! - `web` - Web服务器功能（可选）

pub mod core;
pub mod env;
pub mod network;
pub mod parsers;
pub mod translation;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;

pub use parsers::html;

// Re-export commonly used items for convenience
pub use crate::core::*;
pub use network::*;
pub use parsers::*;
pub use utils::*;
