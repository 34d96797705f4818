//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::MazegakiError;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 认证错误（HTTP 401/403），对整个运行是致命的
    #[error("认证错误: API Key 可能不正确 (状态码 {status}): {message}")]
    Authentication { status: u16, message: String },

    /// API 返回的非成功状态码
    #[error("API错误: {status} - {message} (模型 {model})")]
    ApiError {
        status: u16,
        message: String,
        model: String,
    },

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 所有端点都已尝试且失败
    #[error("所有API端点均失败 (已尝试 {attempted} 个): {last_error}")]
    EndpointsExhausted {
        attempted: usize,
        #[source]
        last_error: Box<TranslationError>,
    },

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 批次处理错误（传输层返回了明确的失败结果）
    #[error("批次处理错误: {0}")]
    BatchProcessingError(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 检查错误是否可重试（换一个端点或下一批次再试）
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::TimeoutError(_) => true,
            TranslationError::ApiError { .. } => true,
            TranslationError::BatchProcessingError(_) => true,
            TranslationError::Authentication { .. } => false,
            TranslationError::EndpointsExhausted { .. } => false,
            TranslationError::ConfigError(_) => false,
            TranslationError::InvalidInput(_) => false,
            TranslationError::ParseError(_) => false,
            TranslationError::SerializationError(_) => false,
            TranslationError::InternalError(_) => false,
        }
    }

    /// 是否属于端点不可用类错误（404 / 400），应直接尝试下一个端点
    pub fn is_endpoint_unavailable(&self) -> bool {
        matches!(
            self,
            TranslationError::ApiError { status, .. } if *status == 404 || *status == 400
        )
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::Authentication { .. } => ErrorSeverity::Critical,
            TranslationError::ApiError { .. } => ErrorSeverity::Warning,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::EndpointsExhausted { .. } => ErrorSeverity::Error,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::BatchProcessingError(_) => ErrorSeverity::Error,
            TranslationError::TimeoutError(_) => ErrorSeverity::Warning,
            TranslationError::ParseError(_) => ErrorSeverity::Error,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::Authentication { .. } => ErrorCategory::Authentication,
            TranslationError::ApiError { .. } => ErrorCategory::Endpoint,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::EndpointsExhausted { .. } => ErrorCategory::Endpoint,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::BatchProcessingError(_) => ErrorCategory::Processing,
            TranslationError::TimeoutError(_) => ErrorCategory::Timeout,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let current_msg = self.to_string();
        let new_msg = format!("{} (上下文: {})", current_msg, context);

        match &mut self {
            TranslationError::ConfigError(ref mut msg) => *msg = new_msg,
            TranslationError::NetworkError(ref mut msg) => *msg = new_msg,
            TranslationError::InvalidInput(ref mut msg) => *msg = new_msg,
            TranslationError::BatchProcessingError(ref mut msg) => *msg = new_msg,
            TranslationError::TimeoutError(ref mut msg) => *msg = new_msg,
            TranslationError::ParseError(ref mut msg) => *msg = new_msg,
            TranslationError::SerializationError(ref mut msg) => *msg = new_msg,
            TranslationError::InternalError(ref mut msg) => *msg = new_msg,
            // 结构化变体只追加到消息字段，保留状态码
            TranslationError::Authentication { ref mut message, .. }
            | TranslationError::ApiError { ref mut message, .. } => {
                message.push_str(&format!(" (上下文: {})", context));
            }
            TranslationError::EndpointsExhausted { .. } => {}
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
///
/// 会随批次响应一起序列化，调用方据此区分致命的认证失败与普通批次失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Endpoint,
    Network,
    Input,
    Processing,
    Timeout,
    Parsing,
    Serialization,
    Internal,
}

/// 从MazegakiError转换
impl From<MazegakiError> for TranslationError {
    fn from(error: MazegakiError) -> Self {
        let msg = error.to_string();

        // 根据错误消息内容判断错误类型
        if msg.contains("timeout") || msg.contains("超时") {
            TranslationError::TimeoutError(msg)
        } else if msg.contains("network") || msg.contains("网络") {
            TranslationError::NetworkError(msg)
        } else if msg.contains("config") || msg.contains("配置") {
            TranslationError::ConfigError(msg)
        } else {
            TranslationError::InternalError(msg)
        }
    }
}

/// 转换为MazegakiError
impl From<TranslationError> for MazegakiError {
    fn from(error: TranslationError) -> Self {
        MazegakiError::new(&error.to_string())
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::NetworkError(format!("IO错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::TimeoutError(format!("请求超时: {}", error))
        } else {
            TranslationError::NetworkError(format!("请求失败: {}", error))
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::TimeoutError(format!("异步操作超时: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误统计信息
#[derive(Debug, Clone, Default)]
pub struct ErrorStats {
    pub total_errors: usize,
    pub by_category: std::collections::HashMap<ErrorCategory, usize>,
    pub by_severity: std::collections::HashMap<ErrorSeverity, usize>,
    pub retryable_errors: usize,
    pub critical_errors: usize,
}

impl ErrorStats {
    /// 记录错误
    pub fn record_error(&mut self, error: &TranslationError) {
        self.total_errors += 1;

        let category = error.category();
        *self.by_category.entry(category).or_insert(0) += 1;

        let severity = error.severity();
        *self.by_severity.entry(severity).or_insert(0) += 1;

        if error.is_retryable() {
            self.retryable_errors += 1;
        }

        if severity == ErrorSeverity::Critical {
            self.critical_errors += 1;
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Default::default();
    }

    /// 获取错误率
    pub fn error_rate(&self, total_operations: usize) -> f64 {
        if total_operations == 0 {
            0.0
        } else {
            self.total_errors as f64 / total_operations as f64
        }
    }
}

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 记录并返回错误
    pub fn log_error<T>(error: TranslationError) -> TranslationResult<T> {
        trace_error(&error);
        Err(error)
    }

    /// 按严重程度记录错误
    pub fn trace_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }
    }

    /// 创建网络错误
    pub fn network_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::NetworkError(msg.to_string())
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ConfigError(msg.to_string())
    }

    /// 创建输入验证错误
    pub fn validation_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::InvalidInput(msg.to_string())
    }

    /// 创建内部错误
    pub fn internal_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::InternalError(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_unavailable_classification() {
        let not_found = TranslationError::ApiError {
            status: 404,
            message: "model not found".to_string(),
            model: "gemini-2.5-flash".to_string(),
        };
        let bad_request = TranslationError::ApiError {
            status: 400,
            message: "bad model".to_string(),
            model: "gemini-2.5-flash".to_string(),
        };
        let server_error = TranslationError::ApiError {
            status: 500,
            message: "internal".to_string(),
            model: "gemini-2.5-flash".to_string(),
        };

        assert!(not_found.is_endpoint_unavailable());
        assert!(bad_request.is_endpoint_unavailable());
        assert!(!server_error.is_endpoint_unavailable());
    }

    #[test]
    fn test_authentication_is_critical_and_not_retryable() {
        let error = TranslationError::Authentication {
            status: 401,
            message: "API key not valid".to_string(),
        };

        assert!(!error.is_retryable());
        assert_eq!(error.severity(), ErrorSeverity::Critical);
        assert_eq!(error.category(), ErrorCategory::Authentication);
        assert!(error.to_string().contains("401"));
    }

    #[test]
    fn test_exhausted_reports_last_cause() {
        let last = TranslationError::NetworkError("connection reset".to_string());
        let error = TranslationError::EndpointsExhausted {
            attempted: 4,
            last_error: Box::new(last),
        };

        let message = error.to_string();
        assert!(message.contains("4"));
        assert!(message.contains("connection reset"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_with_context_keeps_status() {
        let error = TranslationError::ApiError {
            status: 503,
            message: "overloaded".to_string(),
            model: "gemini-2.0-flash".to_string(),
        }
        .with_context("batch 2");

        match error {
            TranslationError::ApiError {
                status, message, ..
            } => {
                assert_eq!(status, 503);
                assert!(message.contains("batch 2"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_error_stats_recording() {
        let mut stats = ErrorStats::default();
        stats.record_error(&TranslationError::NetworkError("a".to_string()));
        stats.record_error(&TranslationError::Authentication {
            status: 403,
            message: "forbidden".to_string(),
        });

        assert_eq!(stats.total_errors, 2);
        assert_eq!(stats.retryable_errors, 1);
        assert_eq!(stats.critical_errors, 1);
        assert_eq!(stats.by_category.get(&ErrorCategory::Network), Some(&1));
        assert_eq!(stats.error_rate(4), 0.5);

        stats.reset();
        assert_eq!(stats.total_errors, 0);
    }

    #[test]
    fn test_category_serializes_camel_case() {
        let json = serde_json::to_string(&ErrorCategory::Authentication).unwrap();
        assert_eq!(json, "\"authentication\"");
    }
}
