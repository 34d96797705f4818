//! 翻译服务核心实现
//!
//! 一次运行的驱动器：检查运行状态与凭据，收集并抽取文本单元，交给引擎翻译。
//! 服务持有显式的运行状态，运行期间再次触发会直接返回。

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::translation::config::TranslationConfig;
use crate::translation::core::client::GeminiClient;
use crate::translation::core::engine::{EngineConfig, RunReport, TranslationEngine};
use crate::translation::error::TranslationResult;
use crate::translation::messages::BatchTransport;
use crate::translation::pipeline::collector::{select_subset, TextCollector};
use crate::translation::pipeline::document::PageDocument;

/// 服务运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// 运行结束时把状态恢复为空闲
struct RunGuard<'a> {
    state: &'a Cell<RunState>,
}

impl<'a> RunGuard<'a> {
    fn enter(state: &'a Cell<RunState>) -> Self {
        state.set(RunState::Running);
        Self { state }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.set(RunState::Idle);
    }
}

/// 单次运行的用户设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub credential: Option<String>,
    /// 翻译比例（百分比）
    pub ratio: u8,
}

impl RunSettings {
    pub fn new(credential: Option<String>, ratio: u8) -> Self {
        Self { credential, ratio }
    }

    /// 修剪后非空的凭据
    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl From<&TranslationConfig> for RunSettings {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            credential: config.api_key.clone(),
            ratio: config.translation_ratio,
        }
    }
}

/// 运行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 已有运行在进行，本次触发被忽略
    AlreadyRunning,
    /// 没有配置凭据
    MissingCredential,
    /// 页面上没有可翻译的文本
    NoEligibleContent,
    /// 按比例抽取后没有文本
    EmptySelection,
    Completed(RunReport),
}

impl RunOutcome {
    /// 提前结束时给用户的提示
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            RunOutcome::AlreadyRunning => Some("翻訳はすでに実行中です。"),
            RunOutcome::MissingCredential => {
                Some("API Keyが設定されていません。設定を保存してから再度実行してください。")
            }
            RunOutcome::NoEligibleContent => Some("翻訳対象のテキストが見つかりませんでした。"),
            RunOutcome::EmptySelection => Some("翻訳対象がありません。"),
            RunOutcome::Completed(_) => None,
        }
    }

    /// 结果名称，用于日志与 HTTP 响应
    pub fn name(&self) -> &'static str {
        match self {
            RunOutcome::AlreadyRunning => "alreadyRunning",
            RunOutcome::MissingCredential => "missingCredential",
            RunOutcome::NoEligibleContent => "noEligibleContent",
            RunOutcome::EmptySelection => "emptySelection",
            RunOutcome::Completed(_) => "completed",
        }
    }

    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// 翻译服务
pub struct TranslationService<T> {
    engine: TranslationEngine<T>,
    state: Cell<RunState>,
    stats: ServiceStats,
}

impl TranslationService<GeminiClient> {
    /// 根据配置创建使用 Gemini 客户端的服务
    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;
        let client = GeminiClient::new(config)?;
        Ok(Self::new(client, EngineConfig::from(config)))
    }
}

impl<T: BatchTransport> TranslationService<T> {
    /// 创建新的翻译服务
    pub fn new(transport: T, config: EngineConfig) -> Self {
        Self {
            engine: TranslationEngine::new(transport, config),
            state: Cell::new(RunState::Idle),
            stats: ServiceStats::default(),
        }
    }

    /// 当前运行状态
    pub fn state(&self) -> RunState {
        self.state.get()
    }

    pub fn engine(&self) -> &TranslationEngine<T> {
        &self.engine
    }

    /// 对文档执行一次翻译运行
    ///
    /// 只有认证失败会返回错误，其余提前结束的情况都以 [`RunOutcome`] 表示。
    pub async fn start<D, R>(
        &self,
        document: &D,
        settings: &RunSettings,
        rng: &mut R,
    ) -> TranslationResult<RunOutcome>
    where
        D: PageDocument,
        R: Rng + ?Sized,
    {
        if self.state.get() == RunState::Running {
            tracing::info!("翻译已在进行中，忽略本次请求");
            return Ok(RunOutcome::AlreadyRunning);
        }

        let _guard = RunGuard::enter(&self.state);
        let start_time = Instant::now();
        self.stats.inc_runs_started();

        let Some(credential) = settings.credential() else {
            tracing::warn!("未配置 API Key");
            return Ok(RunOutcome::MissingCredential);
        };

        tracing::info!("翻译比例: {}%", settings.ratio);

        let mut collector = TextCollector::new();
        let units = collector.collect(document);
        self.stats.add_texts_collected(units.len());
        tracing::debug!("收集统计: {:?}", collector.get_stats());

        if units.is_empty() {
            tracing::info!("没有找到可翻译的日语文本");
            return Ok(RunOutcome::NoEligibleContent);
        }

        let total = units.len();
        let selected = select_subset(units, settings.ratio, rng);
        self.stats.add_texts_selected(selected.len());

        if selected.is_empty() {
            tracing::info!("按比例抽取后没有需要翻译的文本");
            return Ok(RunOutcome::EmptySelection);
        }

        tracing::info!("将翻译 {} / {} 个文本单元", selected.len(), total);

        let result = self.engine.run(document, &selected, credential).await;
        self.stats.add_processing_time(start_time.elapsed());

        match result {
            Ok(report) => {
                self.stats.add_batches_processed(report.batches_total);
                self.stats.add_translations_completed(report.units_translated);
                self.stats.add_errors(report.batches_failed);
                self.stats.inc_runs_completed();
                Ok(RunOutcome::Completed(report))
            }
            Err(error) => {
                self.stats.add_errors(1);
                Err(error)
            }
        }
    }

    /// 获取服务统计
    pub fn get_stats(&self) -> &ServiceStats {
        &self.stats
    }
}

/// 服务统计信息，跨运行累计
#[derive(Debug, Default)]
pub struct ServiceStats {
    pub runs_started: AtomicUsize,
    pub runs_completed: AtomicUsize,
    pub texts_collected: AtomicUsize,
    pub texts_selected: AtomicUsize,
    pub batches_processed: AtomicUsize,
    pub translations_completed: AtomicUsize,
    pub errors_encountered: AtomicUsize,
    /// 微秒
    pub processing_time: AtomicU64,
}

impl ServiceStats {
    pub fn inc_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_runs_completed(&self) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_texts_collected(&self, count: usize) {
        self.texts_collected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_texts_selected(&self, count: usize) {
        self.texts_selected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_batches_processed(&self, count: usize) {
        self.batches_processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_translations_completed(&self, count: usize) {
        self.translations_completed
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_errors(&self, count: usize) {
        self.errors_encountered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_processing_time(&self, duration: Duration) {
        self.processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ServiceStatsSnapshot {
        ServiceStatsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            texts_collected: self.texts_collected.load(Ordering::Relaxed),
            texts_selected: self.texts_selected.load(Ordering::Relaxed),
            batches_processed: self.batches_processed.load(Ordering::Relaxed),
            translations_completed: self.translations_completed.load(Ordering::Relaxed),
            errors_encountered: self.errors_encountered.load(Ordering::Relaxed),
            processing_time: Duration::from_micros(self.processing_time.load(Ordering::Relaxed)),
        }
    }
}

/// 统计快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatsSnapshot {
    pub runs_started: usize,
    pub runs_completed: usize,
    pub texts_collected: usize,
    pub texts_selected: usize,
    pub batches_processed: usize,
    pub translations_completed: usize,
    pub errors_encountered: usize,
    pub processing_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_guard_resets_state() {
        let state = Cell::new(RunState::Idle);
        {
            let _guard = RunGuard::enter(&state);
            assert_eq!(state.get(), RunState::Running);
        }
        assert_eq!(state.get(), RunState::Idle);
    }

    #[test]
    fn test_settings_credential_is_trimmed() {
        assert_eq!(RunSettings::new(Some("  ".to_string()), 50).credential(), None);
        assert_eq!(RunSettings::new(None, 50).credential(), None);
        assert_eq!(
            RunSettings::new(Some(" key ".to_string()), 50).credential(),
            Some("key")
        );
    }

    #[test]
    fn test_outcome_messages() {
        assert!(RunOutcome::MissingCredential.user_message().is_some());
        assert!(RunOutcome::NoEligibleContent.user_message().is_some());
        assert!(RunOutcome::EmptySelection.user_message().is_some());
        assert!(RunOutcome::AlreadyRunning.user_message().is_some());

        let completed = RunOutcome::Completed(RunReport::default());
        assert!(completed.user_message().is_none());
        assert_eq!(completed.name(), "completed");
        assert!(completed.report().is_some());
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = TranslationConfig::default();
        config.api_key = Some("abc".to_string());
        config.translation_ratio = 30;

        let settings = RunSettings::from(&config);
        assert_eq!(settings.credential(), Some("abc"));
        assert_eq!(settings.ratio, 30);
    }
}
