//! 翻译模块
//!
//! 将页面上按比例抽取的日语文本替换为英文译文：
//! - **pipeline**: 文档抽象、文本收集与过滤、抽样、批次切分
//! - **core**: 提示词、响应解析、端点回退客户端、批次引擎与运行驱动
//! - **messages**: 命令与批次响应格式，批次传输接口
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use mazegaki::html::HtmlPage;
//! use mazegaki::translation::{load_translation_config, RunSettings, TranslationService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_translation_config();
//! let service = TranslationService::from_config(&config)?;
//!
//! let page = HtmlPage::from_bytes("<p>こんにちは世界</p>".as_bytes(), "")?;
//! let outcome = service
//!     .start(&page, &RunSettings::from(&config), &mut rand::rng())
//!     .await?;
//! println!("{}", outcome.name());
//! # Ok(())
//! # }
//! ```

/// 配置管理模块
pub mod config;

/// 核心翻译引擎模块
pub mod core;

/// 错误处理模块
pub mod error;

/// 消息层
pub mod messages;

/// 文本处理管道模块
pub mod pipeline;

pub use self::config::{
    config_file_exists, constants, load_translation_config, ConfigManager, TranslationConfig,
};
pub use self::core::{
    build_prompt, parse_translations, EndpointVariant, EngineConfig, GeminiClient, RunOutcome,
    RunReport, RunSettings, RunState, ServiceStats, TranslationEngine, TranslationService,
};
pub use error::{ErrorCategory, ErrorSeverity, ErrorStats, TranslationError, TranslationResult};
pub use messages::{
    handle_command, BatchRequest, BatchResponse, BatchTransport, Command, CommandAck,
    CommandReply,
};
pub use pipeline::{
    contains_japanese, select_subset, Batch, BatchManager, PageDocument, PageUnit, TextCollector,
    TextFilter, TextUnit, VisualState,
};

/// 生成示例配置文件
pub fn generate_example_config(path: &str) -> Result<(), crate::core::MazegakiError> {
    ConfigManager::generate_example_config(path).map_err(|e| {
        crate::core::MazegakiError::new(&format!("生成配置文件失败: {}", e))
    })?;
    tracing::info!("已生成示例配置文件: {}", path);
    Ok(())
}
