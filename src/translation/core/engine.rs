//! 翻译引擎核心实现
//!
//! 负责一次翻译运行中的批次调度：
//!
//! 1. 将所有选中单元标记为加载中
//! 2. 按批次顺序调用传输层，批次之间固定间隔
//! 3. 将译文写回节点；失败的批次撤销加载状态后继续下一批
//!
//! 认证失败对整个运行是致命的：剩余单元全部撤销，错误返回给调用方。

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::translation::config::{constants, TranslationConfig};
use crate::translation::error::{helpers, ErrorStats, TranslationError, TranslationResult};
use crate::translation::messages::{BatchRequest, BatchTransport};
use crate::translation::pipeline::batch::{Batch, BatchManager};
use crate::translation::pipeline::document::{PageDocument, PageUnit, VisualState};

/// 翻译引擎
pub struct TranslationEngine<T> {
    transport: T,
    batch_manager: BatchManager,
    config: EngineConfig,
    stats: EngineStats,
    error_stats: Mutex<ErrorStats>,
}

impl<T: BatchTransport> TranslationEngine<T> {
    /// 创建新的翻译引擎
    pub fn new(transport: T, config: EngineConfig) -> Self {
        Self {
            transport,
            batch_manager: BatchManager::new(config.batch_size),
            config,
            stats: EngineStats::default(),
            error_stats: Mutex::new(ErrorStats::default()),
        }
    }

    /// 传输层
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 翻译给定的文本单元
    ///
    /// 单个批次的失败不会中断运行；只有认证失败会返回错误。
    pub async fn run<D: PageDocument>(
        &self,
        document: &D,
        units: &[PageUnit<D>],
        credential: &str,
    ) -> TranslationResult<RunReport> {
        let start_time = Instant::now();
        let mut report = RunReport::default();

        if units.is_empty() {
            return Ok(report);
        }

        // 发起任何请求之前先显示加载状态
        for unit in units {
            document.set_visual_state(unit, VisualState::Loading);
        }

        let batches = self.batch_manager.create_batches(units);
        report.batches_total = batches.len();

        tracing::info!(
            "开始翻译: {} 个文本单元，分为 {} 个批次",
            units.len(),
            batches.len()
        );

        for (index, batch) in batches.iter().enumerate() {
            if index > 0 && !self.config.batch_delay.is_zero() {
                sleep(self.config.batch_delay).await;
            }

            tracing::info!(
                "处理批次 {}/{}: {} 条文本，{} 字符",
                batch.id,
                batches.len(),
                batch.len(),
                batch.char_count()
            );

            let request = BatchRequest {
                texts: batch.texts(),
                credential: credential.to_string(),
            };
            let batch_start = Instant::now();

            let outcome = match self.transport.send(request).await {
                Ok(response) => response.into_translations(),
                Err(error) => Err(error),
            };

            self.stats.add_processing_time(batch_start.elapsed());

            match outcome {
                Ok(translations) => {
                    self.apply_batch(document, batch, &translations, &mut report);
                    report.batches_succeeded += 1;
                    self.stats.inc_batches_processed();
                }
                Err(error @ TranslationError::Authentication { .. }) => {
                    self.record_error(&error);
                    report.batches_failed += 1;

                    for remaining in &batches[index..] {
                        self.revert_batch(document, remaining, &mut report);
                    }

                    tracing::error!("认证失败，终止翻译运行: {}", error);
                    report.duration = start_time.elapsed();
                    return Err(error);
                }
                Err(error) => {
                    let error = error.with_context(format!("批次 {}", batch.id));
                    self.record_error(&error);
                    report.batches_failed += 1;
                    self.revert_batch(document, batch, &mut report);
                }
            }
        }

        report.duration = start_time.elapsed();
        tracing::info!(
            "翻译完成: 成功 {} 批，失败 {} 批，替换 {} 条，跳过 {} 条，撤销 {} 条，用时 {:?}",
            report.batches_succeeded,
            report.batches_failed,
            report.units_translated,
            report.units_skipped,
            report.units_reverted,
            report.duration
        );

        Ok(report)
    }

    /// 按位置将译文写回节点
    fn apply_batch<D: PageDocument>(
        &self,
        document: &D,
        batch: &Batch<D::Node, D::Container>,
        translations: &[String],
        report: &mut RunReport,
    ) {
        for (position, unit) in batch.items.iter().enumerate() {
            match translations.get(position).map(|text| text.trim()) {
                Some(translated) if !translated.is_empty() => {
                    tracing::trace!("替换文本: {:?} -> {:?}", unit.original_text, translated);
                    document.apply_text(unit, translated);
                    document.set_visual_state(unit, VisualState::Translated);
                    self.stats.add_characters_received(translated.chars().count());
                    report.units_translated += 1;
                }
                _ => {
                    document.set_visual_state(unit, VisualState::Untouched);
                    self.stats.inc_missing_translations();
                    report.units_skipped += 1;
                }
            }
            self.stats.add_characters_sent(unit.char_count());
        }
    }

    fn revert_batch<D: PageDocument>(
        &self,
        document: &D,
        batch: &Batch<D::Node, D::Container>,
        report: &mut RunReport,
    ) {
        for unit in &batch.items {
            document.set_visual_state(unit, VisualState::FailedReverted);
        }
        report.units_reverted += batch.len();
    }

    fn record_error(&self, error: &TranslationError) {
        helpers::trace_error(error);
        self.stats.inc_translation_errors();
        if let Ok(mut error_stats) = self.error_stats.lock() {
            error_stats.record_error(error);
        }
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> &EngineStats {
        &self.stats
    }

    /// 错误统计快照
    pub fn error_stats(&self) -> ErrorStats {
        self.error_stats
            .lock()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    /// 重置统计信息
    pub fn reset_stats(&mut self) {
        self.stats.reset();
        if let Ok(mut error_stats) = self.error_stats.lock() {
            error_stats.reset();
        }
    }
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// 每批最多文本数
    pub batch_size: usize,
    /// 相邻批次之间的等待时间
    pub batch_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: constants::BATCH_SIZE,
            batch_delay: constants::BATCH_DELAY,
        }
    }
}

impl From<&TranslationConfig> for EngineConfig {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            batch_delay: config.batch_delay(),
        }
    }
}

/// 单次运行的结果汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub batches_total: usize,
    pub batches_succeeded: usize,
    pub batches_failed: usize,
    /// 已替换为译文的单元
    pub units_translated: usize,
    /// 译文为空而保持原文的单元
    pub units_skipped: usize,
    /// 因批次失败而撤销的单元
    pub units_reverted: usize,
    #[serde(skip)]
    pub duration: Duration,
}

impl RunReport {
    /// 处理过的单元总数
    pub fn units_total(&self) -> usize {
        self.units_translated + self.units_skipped + self.units_reverted
    }
}

/// 引擎统计信息
#[derive(Debug, Default)]
pub struct EngineStats {
    pub batches_processed: AtomicUsize,
    pub characters_sent: AtomicUsize,
    pub characters_received: AtomicUsize,
    pub translation_errors: AtomicUsize,
    pub missing_translations: AtomicUsize,
    /// 微秒
    pub total_processing_time: AtomicU64,
}

impl EngineStats {
    pub fn inc_batches_processed(&self) {
        self.batches_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_characters_sent(&self, count: usize) {
        self.characters_sent.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_characters_received(&self, count: usize) {
        self.characters_received.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_translation_errors(&self) {
        self.translation_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_missing_translations(&self) {
        self.missing_translations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_processing_time(&self, duration: Duration) {
        self.total_processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn get_batches_processed(&self) -> usize {
        self.batches_processed.load(Ordering::Relaxed)
    }

    pub fn get_translation_errors(&self) -> usize {
        self.translation_errors.load(Ordering::Relaxed)
    }

    pub fn get_missing_translations(&self) -> usize {
        self.missing_translations.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.batches_processed.store(0, Ordering::Relaxed);
        self.characters_sent.store(0, Ordering::Relaxed);
        self.characters_received.store(0, Ordering::Relaxed);
        self.translation_errors.store(0, Ordering::Relaxed);
        self.missing_translations.store(0, Ordering::Relaxed);
        self.total_processing_time.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::messages::BatchResponse;
    use crate::translation::pipeline::document::{TextNodeView, TextUnit};
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingDocument {
        texts: RefCell<HashMap<usize, String>>,
        states: RefCell<HashMap<usize, VisualState>>,
    }

    impl PageDocument for RecordingDocument {
        type Node = usize;
        type Container = usize;

        fn text_nodes(&self) -> Box<dyn Iterator<Item = TextNodeView<usize, usize>> + '_> {
            Box::new(std::iter::empty())
        }

        fn apply_text(&self, unit: &TextUnit<usize, usize>, text: &str) {
            self.texts.borrow_mut().insert(unit.node, text.to_string());
        }

        fn set_visual_state(&self, unit: &TextUnit<usize, usize>, state: VisualState) {
            self.states.borrow_mut().insert(unit.container, state);
        }
    }

    /// 把每条文本转成大写，遇到 "失敗" 时整批失败
    struct UppercaseTransport;

    #[async_trait]
    impl BatchTransport for UppercaseTransport {
        async fn send(&self, request: BatchRequest) -> TranslationResult<BatchResponse> {
            if request.texts.iter().any(|text| text.contains("失敗")) {
                return Err(TranslationError::NetworkError("connection reset".to_string()));
            }
            Ok(BatchResponse::success(
                request
                    .texts
                    .iter()
                    .map(|text| if text.contains("空") { String::new() } else { text.to_uppercase() })
                    .collect(),
            ))
        }
    }

    fn unit(id: usize, text: &str) -> TextUnit<usize, usize> {
        TextUnit {
            id,
            node: id,
            original_text: text.to_string(),
            container: id,
        }
    }

    fn engine(batch_size: usize) -> TranslationEngine<UppercaseTransport> {
        TranslationEngine::new(
            UppercaseTransport,
            EngineConfig {
                batch_size,
                batch_delay: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn test_run_applies_and_skips() {
        let document = RecordingDocument::default();
        let units = vec![unit(0, "abc です"), unit(1, "空の結果")];

        let report = engine(10).run(&document, &units, "key").await.unwrap();

        assert_eq!(report.units_translated, 1);
        assert_eq!(report.units_skipped, 1);
        assert_eq!(document.texts.borrow().get(&0).map(String::as_str), Some("ABC です"));
        assert!(document.texts.borrow().get(&1).is_none());
        assert_eq!(document.states.borrow()[&0], VisualState::Translated);
        assert_eq!(document.states.borrow()[&1], VisualState::Untouched);
    }

    #[tokio::test]
    async fn test_failed_batch_is_reverted_and_run_continues() {
        let document = RecordingDocument::default();
        let units = vec![unit(0, "失敗する"), unit(1, "ok です")];

        let engine = engine(1);
        let report = engine.run(&document, &units, "key").await.unwrap();

        assert_eq!(report.batches_failed, 1);
        assert_eq!(report.batches_succeeded, 1);
        assert_eq!(report.units_reverted, 1);
        assert_eq!(document.states.borrow()[&0], VisualState::FailedReverted);
        assert_eq!(document.states.borrow()[&1], VisualState::Translated);
        assert_eq!(engine.error_stats().total_errors, 1);
        assert_eq!(engine.get_stats().get_translation_errors(), 1);
    }

    #[tokio::test]
    async fn test_empty_units() {
        let document = RecordingDocument::default();
        let report = engine(10).run(&document, &[], "key").await.unwrap();
        assert_eq!(report, RunReport::default());
        assert!(document.states.borrow().is_empty());
    }

    #[test]
    fn test_engine_config_from_translation_config() {
        let mut config = TranslationConfig::default();
        config.batch_size = 4;
        config.batch_delay_ms = 0;

        let engine_config = EngineConfig::from(&config);
        assert_eq!(engine_config.batch_size, 4);
        assert!(engine_config.batch_delay.is_zero());
        assert_eq!(EngineConfig::default().batch_delay, Duration::from_millis(500));
    }
}
