// 集成测试公共模块
//
// 提供内存文档、脚本化的批次传输与 HTML 辅助函数

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use mazegaki::translation::error::{TranslationError, TranslationResult};
use mazegaki::translation::messages::{BatchRequest, BatchResponse, BatchTransport};
use mazegaki::translation::pipeline::document::{
    PageDocument, ParentElement, TextNodeView, TextUnit, VisualState,
};

/// 内存文档中的文本节点
#[derive(Debug, Clone)]
pub struct FakeNode {
    pub text: String,
    pub tag: String,
    pub element_children: usize,
    pub hidden: bool,
    pub has_parent: bool,
}

impl FakeNode {
    pub fn new(tag: &str, text: &str) -> Self {
        Self {
            text: text.to_string(),
            tag: tag.to_string(),
            element_children: 0,
            hidden: false,
            has_parent: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn orphan(mut self) -> Self {
        self.has_parent = false;
        self
    }
}

/// 内存中的页面文档，节点与容器都用下标表示
pub struct FakeDocument {
    nodes: RefCell<Vec<FakeNode>>,
    states: RefCell<Vec<VisualState>>,
    transitions: RefCell<Vec<(usize, VisualState)>>,
}

impl FakeDocument {
    pub fn new(nodes: Vec<FakeNode>) -> Self {
        let states = vec![VisualState::Untouched; nodes.len()];
        Self {
            nodes: RefCell::new(nodes),
            states: RefCell::new(states),
            transitions: RefCell::new(Vec::new()),
        }
    }

    /// `count` 个日语段落
    pub fn japanese_paragraphs(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| FakeNode::new("p", &format!("日本語の段落{}です", i)))
                .collect(),
        )
    }

    pub fn text(&self, index: usize) -> String {
        self.nodes.borrow()[index].text.clone()
    }

    pub fn state(&self, index: usize) -> VisualState {
        self.states.borrow()[index]
    }

    pub fn count_in_state(&self, state: VisualState) -> usize {
        self.states.borrow().iter().filter(|s| **s == state).count()
    }

    /// 按发生顺序记录的状态变化
    pub fn transitions(&self) -> Vec<(usize, VisualState)> {
        self.transitions.borrow().clone()
    }
}

impl PageDocument for FakeDocument {
    type Node = usize;
    type Container = usize;

    fn text_nodes(&self) -> Box<dyn Iterator<Item = TextNodeView<usize, usize>> + '_> {
        let views: Vec<TextNodeView<usize, usize>> = self
            .nodes
            .borrow()
            .iter()
            .enumerate()
            .map(|(index, node)| TextNodeView {
                id: index,
                node: index,
                text: node.text.clone(),
                parent: node.has_parent.then(|| ParentElement {
                    container: index,
                    tag: node.tag.clone(),
                    element_children: node.element_children,
                    hidden: node.hidden,
                }),
            })
            .collect();

        Box::new(views.into_iter())
    }

    fn apply_text(&self, unit: &TextUnit<usize, usize>, text: &str) {
        self.nodes.borrow_mut()[unit.node].text = text.to_string();
    }

    fn set_visual_state(&self, unit: &TextUnit<usize, usize>, state: VisualState) {
        self.states.borrow_mut()[unit.container] = state;
        self.transitions.borrow_mut().push((unit.container, state));
    }
}

/// 模拟译文
pub fn english_for(text: &str) -> String {
    format!("EN[{}]", text)
}

/// 脚本化的批次应答
#[derive(Debug, Clone)]
pub enum Reply {
    /// 每条文本返回 [`english_for`]
    Echo,
    /// 原样返回给定的译文
    Translations(Vec<String>),
    /// 失败响应（非认证）
    Failure(String),
    /// 认证失败响应
    Unauthorized,
    /// 传输层错误
    TransportError(String),
}

/// 按脚本应答的批次传输，脚本用完后回显
pub struct MockTransport {
    script: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<BatchRequest>>,
    call_times: Mutex<Vec<Instant>>,
    gate: Option<Arc<Notify>>,
}

impl MockTransport {
    pub fn echo() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn scripted(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// 每次应答之前等待通知
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn requests(&self) -> Vec<BatchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl BatchTransport for MockTransport {
    async fn send(&self, request: BatchRequest) -> TranslationResult<BatchResponse> {
        self.call_times.lock().unwrap().push(Instant::now());
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let reply = self.script.lock().unwrap().pop_front().unwrap_or(Reply::Echo);

        match reply {
            Reply::Echo => Ok(BatchResponse::success(
                request.texts.iter().map(|text| english_for(text)).collect(),
            )),
            Reply::Translations(translations) => Ok(BatchResponse::success(translations)),
            Reply::Failure(message) => Ok(BatchResponse::failure(
                &TranslationError::BatchProcessingError(message),
            )),
            Reply::Unauthorized => Ok(BatchResponse::failure(&TranslationError::Authentication {
                status: 401,
                message: "API key not valid".to_string(),
            })),
            Reply::TransportError(message) => Err(TranslationError::NetworkError(message)),
        }
    }
}

/// HTML 测试辅助
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 包含各种应排除内容的日语页面
    pub fn create_mixed_japanese_page() -> String {
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="utf-8">
    <title>テストページ</title>
    <style>p { color: black; }</style>
</head>
<body>
    <nav>ホーム</nav>
    <h1>今日のニュース</h1>
    <p>東京で桜が満開になりました。</p>
    <p>This paragraph is English only.</p>
    <p style="display:none">非表示の段落です。</p>
    <script>var message = "スクリプトの中の文字列";</script>
    <div>ブロック要素の本文です</div>
    <div><span>短</span></div>
    <ul><li>一つ目の項目</li><li>二つ目の項目</li></ul>
    <noscript>スクリプトが無効です</noscript>
</body>
</html>"#
            .to_string()
    }

    /// 日语可翻译文本的预期集合（按文档顺序）
    pub fn expected_mixed_page_texts() -> Vec<&'static str> {
        vec![
            "ホーム",
            "今日のニュース",
            "東京で桜が満開になりました。",
            "ブロック要素の本文です",
            "一つ目の項目",
            "二つ目の項目",
        ]
    }

    /// 只有英文的页面
    pub fn create_english_page() -> String {
        "<html><body><h1>Hello</h1><p>Nothing to translate here.</p></body></html>".to_string()
    }

    /// `count` 个日语段落组成的页面
    pub fn create_paragraph_page(count: usize) -> String {
        let paragraphs: String = (0..count)
            .map(|i| format!("<p>これは{}番目の段落です。</p>", i))
            .collect();
        format!(
            "<html><head><title>段落</title></head><body>{}</body></html>",
            paragraphs
        )
    }
}
