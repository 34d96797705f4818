//! 翻译系统核心模块
//!
//! ```text
//! TranslationService (service.rs)
//!     ├── TextCollector / select_subset (pipeline/collector.rs)
//!     └── TranslationEngine (engine.rs)
//!             ├── BatchManager (pipeline/batch.rs)
//!             └── BatchTransport (messages.rs)
//!                     └── GeminiClient (client.rs)
//!                             ├── build_prompt (prompt.rs)
//!                             └── parse_translations (parser.rs)
//! ```

pub mod client;
pub mod engine;
pub mod parser;
pub mod prompt;
pub mod service;

pub use client::{EndpointVariant, GeminiClient};
pub use engine::{EngineConfig, EngineStats, RunReport, TranslationEngine};
pub use parser::parse_translations;
pub use prompt::build_prompt;
pub use service::{RunOutcome, RunSettings, RunState, ServiceStats, TranslationService};
