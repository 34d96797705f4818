//! # 工具模块
//!
//! - `url` - URL清理与协议判断

pub mod url;

pub use url::{clean_url, is_url_and_has_protocol, Url};
