//! 文本收集器模块
//!
//! 遍历页面文档，收集可翻译的日语文本节点，并按比例随机抽取子集

use std::collections::HashSet;
use std::time::Instant;

use rand::seq::index;
use rand::Rng;

use crate::translation::pipeline::document::{PageDocument, PageUnit, TextUnit};
use crate::translation::pipeline::filters::{RejectReason, TextFilter};

/// 文本收集器
pub struct TextCollector {
    filter: TextFilter,
    stats: CollectionStats,
}

impl Default for TextCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TextCollector {
    /// 创建新的收集器
    pub fn new() -> Self {
        Self::with_filter(TextFilter::new())
    }

    /// 使用指定过滤器创建收集器
    pub fn with_filter(filter: TextFilter) -> Self {
        Self {
            filter,
            stats: CollectionStats::default(),
        }
    }

    /// 按文档顺序收集所有可翻译文本单元
    ///
    /// 每次调用都会重新遍历文档，结果按节点身份去重。
    pub fn collect<D: PageDocument>(&mut self, document: &D) -> Vec<PageUnit<D>> {
        let start_time = Instant::now();
        self.stats.reset();

        let mut seen = HashSet::new();
        let mut units = Vec::new();

        for view in document.text_nodes() {
            self.stats.nodes_visited += 1;

            let original_text = match self.filter.evaluate(&view) {
                Ok(text) => text,
                Err(reason) => {
                    self.stats.record_rejection(reason);
                    continue;
                }
            };

            if !seen.insert(view.id) {
                self.stats.duplicate_nodes += 1;
                continue;
            }

            // 通过过滤时一定存在父元素
            let Some(parent) = view.parent else {
                continue;
            };

            units.push(TextUnit {
                id: view.id,
                node: view.node,
                original_text,
                container: parent.container,
            });
        }

        self.stats.accepted = units.len();
        self.stats.collection_time_ms = start_time.elapsed().as_millis() as u64;

        tracing::debug!(
            "文本收集完成: 访问 {} 个文本节点，接受 {} 个",
            self.stats.nodes_visited,
            self.stats.accepted
        );

        units
    }

    /// 获取收集统计
    pub fn get_stats(&self) -> &CollectionStats {
        &self.stats
    }

    /// 重置统计
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

/// 收集统计信息
#[derive(Debug, Clone, Default)]
pub struct CollectionStats {
    pub nodes_visited: usize,
    pub rejected_no_parent: usize,
    pub rejected_excluded: usize,
    pub rejected_short: usize,
    pub rejected_not_japanese: usize,
    pub rejected_not_textual: usize,
    pub rejected_hidden: usize,
    pub duplicate_nodes: usize,
    pub accepted: usize,
    pub collection_time_ms: u64,
}

impl CollectionStats {
    /// 重置统计
    pub fn reset(&mut self) {
        *self = Default::default();
    }

    fn record_rejection(&mut self, reason: RejectReason) {
        let counter = match reason {
            RejectReason::NoParent => &mut self.rejected_no_parent,
            RejectReason::ExcludedParent => &mut self.rejected_excluded,
            RejectReason::TooShort => &mut self.rejected_short,
            RejectReason::NotJapanese => &mut self.rejected_not_japanese,
            RejectReason::NotTextual => &mut self.rejected_not_textual,
            RejectReason::Hidden => &mut self.rejected_hidden,
        };
        *counter += 1;
    }

    /// 被过滤的节点总数
    pub fn total_rejected(&self) -> usize {
        self.rejected_no_parent
            + self.rejected_excluded
            + self.rejected_short
            + self.rejected_not_japanese
            + self.rejected_not_textual
            + self.rejected_hidden
    }

    /// 获取接受率
    pub fn acceptance_rate(&self) -> f32 {
        if self.nodes_visited == 0 {
            0.0
        } else {
            self.accepted as f32 / self.nodes_visited as f32
        }
    }
}

/// 按比例无放回地随机抽取文本单元
///
/// - `ratio >= 100` 原样返回
/// - `ratio == 0` 返回空列表
/// - 其他情况抽取 `ceil(len * ratio / 100)` 个，按抽取顺序返回
pub fn select_subset<T, R: Rng + ?Sized>(units: Vec<T>, ratio: u8, rng: &mut R) -> Vec<T> {
    if ratio >= 100 {
        return units;
    }
    if ratio == 0 || units.is_empty() {
        return Vec::new();
    }

    let total = units.len();
    let count = (total * ratio as usize).div_ceil(100);
    let picks = index::sample(rng, total, count);

    let mut slots: Vec<Option<T>> = units.into_iter().map(Some).collect();
    picks
        .into_iter()
        .filter_map(|position| slots[position].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_select_subset_sizes() {
        let mut rng = StdRng::seed_from_u64(7);
        let units: Vec<usize> = (0..15).collect();

        assert_eq!(select_subset(units.clone(), 100, &mut rng), units);
        assert!(select_subset(units.clone(), 0, &mut rng).is_empty());
        // ceil(15 * 50 / 100) = 8
        assert_eq!(select_subset(units.clone(), 50, &mut rng).len(), 8);
        // ceil(15 * 1 / 100) = 1
        assert_eq!(select_subset(units.clone(), 1, &mut rng).len(), 1);
        assert_eq!(select_subset(units, 99, &mut rng).len(), 15);
    }

    #[test]
    fn test_select_subset_without_replacement() {
        let mut rng = StdRng::seed_from_u64(42);
        let units: Vec<usize> = (0..100).collect();

        let picked = select_subset(units, 37, &mut rng);
        let unique: HashSet<usize> = picked.iter().copied().collect();

        assert_eq!(picked.len(), 37);
        assert_eq!(unique.len(), 37);
        assert!(picked.iter().all(|value| *value < 100));
    }

    #[test]
    fn test_select_subset_is_seed_deterministic() {
        let units: Vec<usize> = (0..40).collect();
        let first = select_subset(units.clone(), 30, &mut StdRng::seed_from_u64(3));
        let second = select_subset(units, 30, &mut StdRng::seed_from_u64(3));
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_subset_empty_input() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_subset(Vec::<usize>::new(), 50, &mut rng).is_empty());
    }

    #[test]
    fn test_collection_stats_totals() {
        let mut stats = CollectionStats::default();
        stats.nodes_visited = 4;
        stats.record_rejection(RejectReason::Hidden);
        stats.record_rejection(RejectReason::TooShort);
        stats.accepted = 2;

        assert_eq!(stats.total_rejected(), 2);
        assert_eq!(stats.rejected_hidden, 1);
        assert!((stats.acceptance_rate() - 0.5).abs() < f32::EPSILON);
    }
}
