//! 页面文档抽象
//!
//! 文本收集与结果回写只通过 [`PageDocument`] 访问文档，
//! 因此既可以作用于 html5ever 解析出的真实 DOM，也可以作用于测试用的内存树。

/// 文本单元所在容器的可视状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
    /// 未处理
    Untouched,
    /// 等待翻译结果
    Loading,
    /// 已替换为译文
    Translated,
    /// 所在批次失败，已撤销加载状态
    FailedReverted,
}

impl VisualState {
    /// 在页面上与未处理状态无法区分
    pub fn is_untouched_equivalent(self) -> bool {
        matches!(self, VisualState::Untouched | VisualState::FailedReverted)
    }
}

/// 文本节点父元素的描述
#[derive(Debug, Clone)]
pub struct ParentElement<C> {
    /// 指向父元素的非拥有引用
    pub container: C,
    /// 小写标签名
    pub tag: String,
    /// 子元素（不含文本节点）数量
    pub element_children: usize,
    /// 父元素的计算样式是否隐藏
    pub hidden: bool,
}

/// 遍历过程中产出的原始文本节点
#[derive(Debug, Clone)]
pub struct TextNodeView<N, C> {
    /// 节点身份，用于去重
    pub id: usize,
    pub node: N,
    /// 未经修剪的文本内容
    pub text: String,
    /// 没有父元素时为 None
    pub parent: Option<ParentElement<C>>,
}

/// 可翻译的文本单元
///
/// `node` 与 `container` 都不拥有文档节点，文档的生命周期长于一次翻译运行。
#[derive(Debug, Clone)]
pub struct TextUnit<N, C> {
    pub id: usize,
    pub node: N,
    /// 收集时修剪后的文本
    pub original_text: String,
    pub container: C,
}

impl<N, C> TextUnit<N, C> {
    /// 文本字符数
    pub fn char_count(&self) -> usize {
        self.original_text.chars().count()
    }
}

/// 文档能力接口
pub trait PageDocument {
    /// 文本节点引用
    type Node: Clone;
    /// 容器元素引用
    type Container: Clone;

    /// 从文档主体开始一次新的惰性遍历，按文档顺序产出文本节点
    fn text_nodes(&self) -> Box<dyn Iterator<Item = TextNodeView<Self::Node, Self::Container>> + '_>;

    /// 替换文本单元对应节点的文本内容
    fn apply_text(&self, unit: &TextUnit<Self::Node, Self::Container>, text: &str);

    /// 设置文本单元所在容器的可视状态
    fn set_visual_state(&self, unit: &TextUnit<Self::Node, Self::Container>, state: VisualState);
}

/// 某个文档类型对应的文本单元
pub type PageUnit<D> = TextUnit<<D as PageDocument>::Node, <D as PageDocument>::Container>;
