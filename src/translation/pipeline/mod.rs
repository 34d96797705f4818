//! 翻译管道模块
//!
//! 提供文本处理管道，包括文档抽象、收集、过滤、抽样和批次切分

pub mod batch;
pub mod collector;
pub mod document;
pub mod filters;

// 重新导出主要类型
pub use batch::{Batch, BatchManager, BatchStats};
pub use collector::{select_subset, CollectionStats, TextCollector};
pub use document::{PageDocument, PageUnit, ParentElement, TextNodeView, TextUnit, VisualState};
pub use filters::{contains_japanese, RejectReason, TextFilter};
