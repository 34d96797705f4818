//! 翻译批次管理器模块
//!
//! 将选中的文本单元按顺序切分为固定大小的批次。
//! 批次保持原有顺序，除最后一个外每个批次都是满的。

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::translation::config::constants;
use crate::translation::pipeline::document::TextUnit;

/// 翻译批次
#[derive(Debug, Clone)]
pub struct Batch<N, C> {
    /// 批次序号，从 1 开始
    pub id: usize,
    pub items: Vec<TextUnit<N, C>>,
}

impl<N, C> Batch<N, C> {
    /// 发送给翻译端点的文本
    pub fn texts(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| item.original_text.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 批次总字符数
    pub fn char_count(&self) -> usize {
        self.items.iter().map(TextUnit::char_count).sum()
    }
}

/// 批次管理器
pub struct BatchManager {
    batch_size: usize,
    stats: BatchStats,
}

impl Default for BatchManager {
    fn default() -> Self {
        Self::new(constants::BATCH_SIZE)
    }
}

impl BatchManager {
    /// 创建批次管理器，`batch_size` 至少为 1
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            stats: BatchStats::default(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 按顺序切分批次
    pub fn create_batches<N: Clone, C: Clone>(&self, units: &[TextUnit<N, C>]) -> Vec<Batch<N, C>> {
        let batches: Vec<Batch<N, C>> = units
            .chunks(self.batch_size)
            .enumerate()
            .map(|(index, chunk)| Batch {
                id: index + 1,
                items: chunk.to_vec(),
            })
            .collect();

        self.stats.add_input_items(units.len());
        self.stats.add_output_batches(batches.len());

        tracing::debug!(
            "创建了 {} 个批次，共 {} 个文本单元",
            batches.len(),
            units.len()
        );

        batches
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> &BatchStats {
        &self.stats
    }

    /// 重置统计信息
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

/// 批次统计信息
#[derive(Debug, Default)]
pub struct BatchStats {
    /// 输入的文本单元总数
    pub input_items: AtomicUsize,
    /// 输出的批次总数
    pub output_batches: AtomicUsize,
}

impl BatchStats {
    pub fn add_input_items(&self, count: usize) {
        self.input_items.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_output_batches(&self, count: usize) {
        self.output_batches.fetch_add(count, Ordering::Relaxed);
    }

    pub fn get_input_items(&self) -> usize {
        self.input_items.load(Ordering::Relaxed)
    }

    pub fn get_output_batches(&self) -> usize {
        self.output_batches.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.input_items.store(0, Ordering::Relaxed);
        self.output_batches.store(0, Ordering::Relaxed);
    }
}
