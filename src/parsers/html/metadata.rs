//! HTML 文档元数据处理模块
//!
//! - 读取字符编码声明与文档标题
//! - 生成翻译来源注释

use chrono::{SecondsFormat, Utc};
use markup5ever_rcdom::{Handle, NodeData};

use crate::core::parse_content_type;
use crate::utils::url::{clean_url, Url};

use super::dom::{find_nodes, get_node_attr};

/// 获取文档字符编码
///
/// 支持 `<meta charset="...">` 与
/// `<meta http-equiv="content-type" content="text/html; charset=...">` 两种写法。
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, &["html", "head", "meta"]).iter() {
        if let Some(meta_charset_node_attr_value) = get_node_attr(meta_node, "charset") {
            return Some(meta_charset_node_attr_value);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(meta_content_type_node_attr_value) = get_node_attr(meta_node, "content") {
                let (_media_type, charset, _is_base64) =
                    parse_content_type(&meta_content_type_node_attr_value);
                if !charset.is_empty() {
                    return Some(charset);
                }
            }
        }
    }

    None
}

/// 获取文档标题
pub fn get_title(node: &Handle) -> Option<String> {
    for title_node in find_nodes(node, &["html", "head", "title"]).iter() {
        for child_node in title_node.children.borrow().iter() {
            if let NodeData::Text { ref contents } = child_node.data {
                return Some(contents.borrow().trim().to_string());
            }
        }
    }

    None
}

/// 生成翻译来源注释
///
/// HTTP(S) 地址会去掉凭据与片段；其他来源记为 "local source"。
pub fn create_metadata_tag(url: Option<&Url>) -> String {
    let datetime: &str = &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let source = match url {
        Some(url) if url.scheme() == "http" || url.scheme() == "https" => {
            let mut clean_url: Url = clean_url(url.clone());
            // http(s) 地址总是可以清除凭据
            let _ = clean_url.set_username("");
            let _ = clean_url.set_password(None);
            clean_url.to_string()
        }
        _ => "local source".to_string(),
    };

    format!(
        "<!-- Translated from {} at {} using {} v{} -->",
        source,
        datetime,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
}
