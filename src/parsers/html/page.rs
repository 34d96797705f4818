//! 基于 rcdom 的页面文档
//!
//! [`HtmlPage`] 为 html5ever 解析出的 DOM 实现 [`PageDocument`]：
//! 从 `<body>` 开始按文档顺序惰性遍历文本节点，并用 `data-mazegaki-*`
//! 属性表示容器的可视状态。

use std::rc::{Rc, Weak};

use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::format_tendril;
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::core::MazegakiError;
use crate::parsers::css::InlineVisibility;
use crate::translation::config::constants;
use crate::translation::pipeline::document::{
    PageDocument, ParentElement, TextNodeView, TextUnit, VisualState,
};

use super::dom::{
    count_element_children, find_nodes, get_child_node_by_name, get_node_attr, get_node_name,
    get_parent_node, has_node_attr, html_to_dom, node_id, set_node_attr,
};
use super::metadata::get_charset;
use super::serializer::serialize_document;

/// 状态标记的展示样式
const MARKER_STYLESHEET: &str = "[data-mazegaki-translating]{color:#bbb;transition:color .3s}\
[data-mazegaki-translated]{color:#1e3a8a;font-weight:500}";

/// 解析后的 HTML 页面
pub struct HtmlPage {
    dom: RcDom,
    encoding: String,
}

impl HtmlPage {
    /// 从原始字节解析页面
    ///
    /// `encoding` 为空时先按 UTF-8 解析，若文档声明了其他字符集则按声明重新解析。
    pub fn from_bytes(data: &[u8], encoding: &str) -> Result<Self, MazegakiError> {
        let mut document_encoding = encoding.to_string();
        let mut dom = html_to_dom(data, &document_encoding)?;

        if document_encoding.is_empty() {
            if let Some(charset) = get_charset(&dom.document) {
                if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("utf8")
                {
                    tracing::debug!("文档声明的字符集: {}", charset);
                    document_encoding = charset;
                    dom = html_to_dom(data, &document_encoding)?;
                }
            }
        }

        Ok(Self {
            dom,
            encoding: document_encoding,
        })
    }

    /// 包装已有的 DOM
    pub fn from_dom(dom: RcDom, encoding: &str) -> Self {
        Self {
            dom,
            encoding: encoding.to_string(),
        }
    }

    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// 文档主体
    pub fn body(&self) -> Option<Handle> {
        find_nodes(&self.dom.document, &["html", "body"])
            .into_iter()
            .next()
    }

    /// 在 `<head>` 中加入状态标记的样式
    pub fn inject_marker_styles(&self) {
        let Some(html) = get_child_node_by_name(&self.dom.document, "html") else {
            return;
        };
        let Some(head) = get_child_node_by_name(&html, "head") else {
            return;
        };

        let style = create_element(
            &self.dom,
            QualName::new(None, ns!(html), LocalName::from("style")),
            vec![Attribute {
                name: QualName::new(None, ns!(), LocalName::from("data-mazegaki")),
                value: format_tendril!("markers"),
            }],
        );
        let text = Node::new(NodeData::Text {
            contents: std::cell::RefCell::new(MARKER_STYLESHEET.into()),
        });
        text.parent.set(Some(Rc::downgrade(&style)));
        style.children.borrow_mut().push(text);

        style.parent.set(Some(Rc::downgrade(&head)));
        head.children.borrow_mut().push(style);
    }

    /// 序列化为原始编码的字节
    pub fn to_bytes(&self) -> Result<Vec<u8>, MazegakiError> {
        serialize_document(&self.dom, &self.encoding)
    }

    /// 序列化为 UTF-8 字符串
    pub fn to_html_string(&self) -> Result<String, MazegakiError> {
        let bytes = serialize_document(&self.dom, "")?;
        String::from_utf8(bytes).map_err(|e| MazegakiError::new(&format!("序列化结果不是UTF-8: {}", e)))
    }
}

/// 遍历栈中的一项
struct PendingNode {
    node: Handle,
    /// 从祖先继承的 `visibility` 是否为隐藏
    inherited_invisible: bool,
    /// 父元素是否被隐藏
    parent_hidden: bool,
}

/// 按文档顺序产出文本节点的惰性遍历器
struct TextNodeWalker {
    stack: Vec<PendingNode>,
}

impl TextNodeWalker {
    fn new(root: Option<Handle>) -> Self {
        let stack = root
            .map(|body| {
                let inherited_invisible = get_parent_node(&body)
                    .map_or(false, |html| own_visibility(&html).visibility_hidden == Some(true));
                vec![PendingNode {
                    node: body,
                    inherited_invisible,
                    parent_hidden: false,
                }]
            })
            .unwrap_or_default();

        Self { stack }
    }
}

impl Iterator for TextNodeWalker {
    type Item = TextNodeView<Handle, Weak<Node>>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(pending) = self.stack.pop() {
            match &pending.node.data {
                NodeData::Element { .. } => {
                    let own = own_visibility(&pending.node);
                    let invisible = own.visibility_hidden.unwrap_or(pending.inherited_invisible);
                    let hidden = own.display_none
                        || own.opacity_zero
                        || invisible
                        || has_node_attr(&pending.node, "hidden");

                    let children = pending.node.children.borrow();
                    for child in children.iter().rev() {
                        self.stack.push(PendingNode {
                            node: child.clone(),
                            inherited_invisible: invisible,
                            parent_hidden: hidden,
                        });
                    }
                }
                NodeData::Text { contents } => {
                    let text = contents.borrow().to_string();
                    let parent = get_parent_node(&pending.node).and_then(|parent| {
                        let tag = get_node_name(&parent)?.to_ascii_lowercase();
                        Some(ParentElement {
                            container: Rc::downgrade(&parent),
                            tag,
                            element_children: count_element_children(&parent),
                            hidden: pending.parent_hidden,
                        })
                    });

                    return Some(TextNodeView {
                        id: node_id(&pending.node),
                        node: pending.node.clone(),
                        text,
                        parent,
                    });
                }
                _ => {}
            }
        }

        None
    }
}

fn own_visibility(node: &Handle) -> InlineVisibility {
    get_node_attr(node, "style")
        .map(|style| InlineVisibility::from_style(&style))
        .unwrap_or_default()
}

impl PageDocument for HtmlPage {
    type Node = Handle;
    type Container = Weak<Node>;

    fn text_nodes(&self) -> Box<dyn Iterator<Item = TextNodeView<Handle, Weak<Node>>> + '_> {
        Box::new(TextNodeWalker::new(self.body()))
    }

    fn apply_text(&self, unit: &TextUnit<Handle, Weak<Node>>, text: &str) {
        if let NodeData::Text { contents } = &unit.node.data {
            *contents.borrow_mut() = text.into();
        }
    }

    fn set_visual_state(&self, unit: &TextUnit<Handle, Weak<Node>>, state: VisualState) {
        // 容器已从文档中移除
        let Some(container) = unit.container.upgrade() else {
            return;
        };

        match state {
            VisualState::Loading => {
                set_node_attr(&container, constants::ATTR_TRANSLATING, Some("true".to_string()));
            }
            VisualState::Translated => {
                set_node_attr(&container, constants::ATTR_TRANSLATING, None);
                set_node_attr(&container, constants::ATTR_TRANSLATED, Some("true".to_string()));
                set_node_attr(
                    &container,
                    constants::ATTR_ORIGINAL,
                    Some(unit.original_text.clone()),
                );
                set_node_attr(
                    &container,
                    "title",
                    Some(format!("{}{}", constants::ORIGINAL_TITLE_PREFIX, unit.original_text)),
                );
            }
            VisualState::Untouched | VisualState::FailedReverted => {
                set_node_attr(&container, constants::ATTR_TRANSLATING, None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::pipeline::collector::TextCollector;

    fn page(body: &str) -> HtmlPage {
        let html = format!("<html><head><title>t</title></head><body>{}</body></html>", body);
        HtmlPage::from_bytes(html.as_bytes(), "utf-8").unwrap()
    }

    fn texts(page: &HtmlPage) -> Vec<String> {
        page.text_nodes()
            .map(|view| view.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }

    #[test]
    fn test_walk_in_document_order() {
        let page = page("<h1>見出し</h1><div><p>段落一</p><p>段落<b>二</b></p></div><footer>足</footer>");
        assert_eq!(texts(&page), vec!["見出し", "段落一", "段落", "二", "足"]);
    }

    #[test]
    fn test_each_walk_is_fresh() {
        let page = page("<p>一回目</p>");
        assert_eq!(texts(&page), texts(&page));
    }

    #[test]
    fn test_parent_description() {
        let page = page("<nav>メニュー</nav><div>本文<span>補足</span></div>");
        let views: Vec<_> = page.text_nodes().collect();

        let nav = views[0].parent.as_ref().unwrap();
        assert_eq!(nav.tag, "nav");
        assert_eq!(nav.element_children, 0);

        let div = views[1].parent.as_ref().unwrap();
        assert_eq!(div.tag, "div");
        assert_eq!(div.element_children, 1);
    }

    #[test]
    fn test_hidden_detection() {
        let page = page(
            "<p style=\"display:none\">非表示一</p>\
             <p hidden>非表示二</p>\
             <p style=\"opacity: 0\">非表示三</p>\
             <div style=\"visibility:hidden\"><p>継承された非表示</p><p style=\"visibility:visible\">再表示</p></div>\
             <div style=\"display:none\"><p>祖先のdisplayは継承しない</p></div>\
             <p>表示</p>",
        );

        let hidden: Vec<(String, bool)> = page
            .text_nodes()
            .map(|view| (view.text, view.parent.map_or(false, |parent| parent.hidden)))
            .collect();

        let lookup = |text: &str| hidden.iter().find(|(t, _)| t == text).map(|(_, h)| *h);
        assert_eq!(lookup("非表示一"), Some(true));
        assert_eq!(lookup("非表示二"), Some(true));
        assert_eq!(lookup("非表示三"), Some(true));
        assert_eq!(lookup("継承された非表示"), Some(true));
        assert_eq!(lookup("再表示"), Some(false));
        assert_eq!(lookup("祖先のdisplayは継承しない"), Some(false));
        assert_eq!(lookup("表示"), Some(false));
    }

    #[test]
    fn test_text_outside_body_is_ignored() {
        let page = page("<p>本文です</p>");
        assert_eq!(texts(&page), vec!["本文です"]);
    }

    #[test]
    fn test_visual_states_and_apply_text() {
        let page = page("<p>こんにちは世界</p>");
        let mut collector = TextCollector::new();
        let units = collector.collect(&page);
        assert_eq!(units.len(), 1);
        let unit = &units[0];

        page.set_visual_state(unit, VisualState::Loading);
        let html = page.to_html_string().unwrap();
        assert!(html.contains("data-mazegaki-translating=\"true\""));

        page.apply_text(unit, "Hello world");
        page.set_visual_state(unit, VisualState::Translated);
        let html = page.to_html_string().unwrap();
        assert!(!html.contains("data-mazegaki-translating"));
        assert!(html.contains("data-mazegaki-translated=\"true\""));
        assert!(html.contains("data-mazegaki-original=\"こんにちは世界\""));
        assert!(html.contains("title=\"元のテキスト: こんにちは世界\""));
        assert!(html.contains(">Hello world</p>"));
    }

    #[test]
    fn test_failed_revert_clears_loading() {
        let page = page("<p>失敗する段落</p>");
        let units = TextCollector::new().collect(&page);
        let unit = &units[0];

        page.set_visual_state(unit, VisualState::Loading);
        page.set_visual_state(unit, VisualState::FailedReverted);

        let html = page.to_html_string().unwrap();
        assert!(!html.contains("data-mazegaki"));
        assert!(html.contains(">失敗する段落</p>"));
    }

    #[test]
    fn test_declared_charset_is_used() {
        let source = "<html><head><meta charset=\"shift_jis\"></head><body><p>日本語の本文</p></body></html>";
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(source);

        let page = HtmlPage::from_bytes(&bytes, "").unwrap();
        assert_eq!(page.encoding(), "shift_jis");
        assert_eq!(texts(&page), vec!["日本語の本文"]);
    }

    #[test]
    fn test_marker_styles() {
        let page = page("<p>本文</p>");
        page.inject_marker_styles();

        let html = page.to_html_string().unwrap();
        assert!(html.contains("<style data-mazegaki=\"markers\">"));
        assert!(html.contains("[data-mazegaki-translated]"));
    }
}
