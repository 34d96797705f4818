//! 文本过滤器模块
//!
//! 判断页面上的文本节点是否属于可翻译的日语正文

use std::collections::HashSet;

use crate::translation::config::constants;
use crate::translation::pipeline::document::{ParentElement, TextNodeView};

/// 文本节点被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// 没有父元素
    NoParent,
    /// 父元素属于脚本、样式等结构性标签
    ExcludedParent,
    /// 修剪后文本过短
    TooShort,
    /// 不含日文字符
    NotJapanese,
    /// 既非正文标签，也非无子元素的块级容器，且文本不够长
    NotTextual,
    /// 父元素不可见
    Hidden,
}

/// 判断字符是否属于平假名、片假名或常用汉字区段
pub fn is_japanese_char(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FAF}')
}

/// 文本中是否至少含有一个日文字符
pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(is_japanese_char)
}

/// 文本过滤器
pub struct TextFilter {
    excluded_tags: HashSet<&'static str>,
    textual_tags: HashSet<&'static str>,
    block_container_tags: HashSet<&'static str>,
    min_text_length: usize,
    long_text_length: usize,
}

impl Default for TextFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFilter {
    /// 创建新的文本过滤器
    pub fn new() -> Self {
        Self {
            excluded_tags: constants::EXCLUDED_PARENT_TAGS.iter().copied().collect(),
            textual_tags: constants::TEXTUAL_TAGS.iter().copied().collect(),
            block_container_tags: constants::BLOCK_CONTAINER_TAGS.iter().copied().collect(),
            min_text_length: constants::MIN_TEXT_LENGTH,
            long_text_length: constants::LONG_TEXT_LENGTH,
        }
    }

    /// 检查文本节点，通过时返回修剪后的文本
    pub fn evaluate<N, C>(&self, view: &TextNodeView<N, C>) -> Result<String, RejectReason> {
        let parent = view.parent.as_ref().ok_or(RejectReason::NoParent)?;

        if self.is_excluded_parent(&parent.tag) {
            return Err(RejectReason::ExcludedParent);
        }

        let trimmed = view.text.trim();
        let char_count = trimmed.chars().count();
        if char_count < self.min_text_length {
            return Err(RejectReason::TooShort);
        }

        if !contains_japanese(trimmed) {
            return Err(RejectReason::NotJapanese);
        }

        let textual = self.is_textual_tag(&parent.tag)
            || self.is_childless_block_container(parent)
            || char_count > self.long_text_length;
        if !textual {
            return Err(RejectReason::NotTextual);
        }

        if parent.hidden {
            return Err(RejectReason::Hidden);
        }

        Ok(trimmed.to_string())
    }

    /// 父元素标签是否被结构性排除
    pub fn is_excluded_parent(&self, tag: &str) -> bool {
        self.excluded_tags.contains(tag)
    }

    /// 是否为正文标签
    pub fn is_textual_tag(&self, tag: &str) -> bool {
        self.textual_tags.contains(tag)
    }

    /// 是否为没有子元素的块级容器
    pub fn is_childless_block_container<C>(&self, parent: &ParentElement<C>) -> bool {
        parent.element_children == 0 && self.block_container_tags.contains(parent.tag.as_str())
    }
}
