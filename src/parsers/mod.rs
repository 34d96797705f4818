//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作、元数据处理、页面文档实现
//! - `css` - 内联样式解析与隐藏判断

pub mod css;
pub mod html;

pub use css::{parse_inline_style, InlineVisibility, StyleDeclaration};
pub use html::{
    create_metadata_tag, get_charset, get_title, html_to_dom, serialize_document, HtmlPage,
};
