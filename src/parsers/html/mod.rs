//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作
//! - `metadata`: 字符集、标题与来源注释
//! - `serializer`: 序列化功能
//! - `page`: 可翻译的页面文档

pub mod dom;
pub mod metadata;
pub mod page;
pub mod serializer;

pub use dom::{
    count_element_children, find_nodes, get_child_node_by_name, get_node_attr, get_node_name,
    get_parent_node, has_node_attr, html_to_dom, node_id, set_node_attr,
};
pub use metadata::{create_metadata_tag, get_charset, get_title};
pub use page::HtmlPage;
pub use serializer::serialize_document;
