//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量管理

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 变量是否在环境中显式设置
    fn is_set() -> bool {
        env::var_os(Self::NAME).is_some()
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "MAZEGAKI_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// Gemini API Key
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "MAZEGAKI_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Gemini API key (falls back to GEMINI_API_KEY)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME).or_else(|_| env::var(GeminiApiKey::NAME)) {
                Ok(value) => Self::parse(&value),
                Err(_) => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Required environment variable not set".to_string(),
                }),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key cannot be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// Google 工具链通用的 API Key 变量名
    pub struct GeminiApiKey;
    impl EnvVar<String> for GeminiApiKey {
        const NAME: &'static str = "GEMINI_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Gemini API key";

        fn parse(value: &str) -> EnvResult<String> {
            ApiKey::parse(value)
        }
    }

    /// 翻译比例（百分比）
    pub struct Ratio;
    impl EnvVar<u8> for Ratio {
        const NAME: &'static str = "MAZEGAKI_TRANSLATION_RATIO";
        const DEFAULT: Option<u8> = Some(50);
        const DESCRIPTION: &'static str = "Percentage of eligible Japanese text to translate (0-100)";

        fn parse(value: &str) -> EnvResult<u8> {
            let ratio = parse_positive_usize(value, Self::NAME, 0, 100)?;
            Ok(ratio as u8)
        }
    }

    /// 批次大小
    pub struct BatchSize;
    impl EnvVar<usize> for BatchSize {
        const NAME: &'static str = "MAZEGAKI_BATCH_SIZE";
        const DEFAULT: Option<usize> = Some(10);
        const DESCRIPTION: &'static str = "Maximum number of text nodes per translation request";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 10)
        }
    }

    /// 批次间隔
    pub struct BatchDelayMs;
    impl EnvVar<u64> for BatchDelayMs {
        const NAME: &'static str = "MAZEGAKI_BATCH_DELAY_MS";
        const DEFAULT: Option<u64> = Some(500);
        const DESCRIPTION: &'static str = "Pause between consecutive batches in milliseconds";

        fn parse(value: &str) -> EnvResult<u64> {
            let delay = parse_positive_usize(value, Self::NAME, 0, 60_000)?;
            Ok(delay as u64)
        }
    }

    /// API 基础地址
    pub struct ApiBaseUrl;
    impl EnvVar<String> for ApiBaseUrl {
        const NAME: &'static str = "MAZEGAKI_API_BASE_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => {
                    Ok("https://generativelanguage.googleapis.com/v1beta".to_string())
                }
            }
        }
        const DESCRIPTION: &'static str = "Gemini API base URL";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim().trim_end_matches('/');
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }
}

/// 解析布尔值
pub fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off", value),
        }),
    }
}

/// 解析带范围的整数
pub fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid non-negative number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value too small (minimum {})", min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value too large (maximum {})", max),
        });
    }

    Ok(num)
}

/// 所有已知环境变量的说明，用于 `--help` 之外的文档输出
pub fn describe_all() -> Vec<(&'static str, &'static str)> {
    use self::core::{LogLevel, NoColor};
    use self::translation::{ApiBaseUrl, ApiKey, BatchDelayMs, BatchSize, GeminiApiKey, Ratio};

    vec![
        (ApiKey::NAME, ApiKey::DESCRIPTION),
        (GeminiApiKey::NAME, GeminiApiKey::DESCRIPTION),
        (Ratio::NAME, Ratio::DESCRIPTION),
        (BatchSize::NAME, BatchSize::DESCRIPTION),
        (BatchDelayMs::NAME, BatchDelayMs::DESCRIPTION),
        (ApiBaseUrl::NAME, ApiBaseUrl::DESCRIPTION),
        (LogLevel::NAME, LogLevel::DESCRIPTION),
        (NoColor::NAME, NoColor::DESCRIPTION),
    ]
}

/// 初始化日志输出
///
/// 级别取自 `MAZEGAKI_LOG_LEVEL`，输出到标准错误。`quiet` 在未显式设置级别时只保留错误。
pub fn init_tracing(quiet: bool) {
    use self::core::{LogLevel, NoColor};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match LogLevel::get() {
        Ok(_) if quiet && !LogLevel::is_set() => "error".to_string(),
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            "info".to_string()
        }
    };

    let ansi = atty::is(atty::Stream::Stderr) && !NoColor::get_or_default(false);

    // 重复初始化时保留已有的订阅者
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(ansi),
        )
        .try_init();
}
