//! 消息层
//!
//! 页面侧与翻译后端之间的命令与响应格式，以及批次传输接口。
//! JSON 字段使用 camelCase，与浏览器扩展的消息格式保持一致。

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::error::{ErrorCategory, TranslationError, TranslationResult};

/// 批次翻译请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
    #[serde(rename = "apiKey")]
    pub credential: String,
}

/// 页面侧可发送的命令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// 开始一次翻译运行
    StartTranslation,
    /// 翻译一个批次
    TranslateBatch(BatchRequest),
}

/// `startTranslation` 的确认
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    pub success: bool,
}

/// 批次翻译响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
}

impl BatchResponse {
    /// 成功响应
    pub fn success(translations: Vec<String>) -> Self {
        Self {
            success: true,
            translations: Some(translations),
            error: None,
            error_category: None,
        }
    }

    /// 失败响应，携带错误类别以便调用方识别认证失败
    pub fn failure(error: &TranslationError) -> Self {
        Self {
            success: false,
            translations: None,
            error: Some(error.to_string()),
            error_category: Some(error.category()),
        }
    }

    /// 是否为认证失败
    pub fn is_authentication_failure(&self) -> bool {
        !self.success && self.error_category == Some(ErrorCategory::Authentication)
    }

    /// 转换为译文列表，失败响应转换为对应的错误
    pub fn into_translations(self) -> TranslationResult<Vec<String>> {
        if self.success {
            return Ok(self.translations.unwrap_or_default());
        }

        let message = self
            .error
            .unwrap_or_else(|| "翻译后端未返回错误信息".to_string());

        match self.error_category {
            Some(ErrorCategory::Authentication) => Err(TranslationError::Authentication {
                status: 401,
                message,
            }),
            _ => Err(TranslationError::BatchProcessingError(message)),
        }
    }
}

/// 命令的应答
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandReply {
    Ack(CommandAck),
    Batch(BatchResponse),
}

/// 批次传输接口
///
/// 引擎只通过该接口发送批次，测试中可以替换为脚本化的实现。
#[async_trait]
pub trait BatchTransport: Send + Sync {
    async fn send(&self, request: BatchRequest) -> TranslationResult<BatchResponse>;
}

#[async_trait]
impl<T: BatchTransport + ?Sized> BatchTransport for Arc<T> {
    async fn send(&self, request: BatchRequest) -> TranslationResult<BatchResponse> {
        (**self).send(request).await
    }
}

/// 处理一条命令
///
/// 传输层返回的错误会转换为失败响应，不会向调用方传播。
pub async fn handle_command<T>(transport: &T, command: Command) -> CommandReply
where
    T: BatchTransport + ?Sized,
{
    match command {
        Command::StartTranslation => CommandReply::Ack(CommandAck { success: true }),
        Command::TranslateBatch(request) => {
            tracing::debug!("收到批次翻译请求: {} 条文本", request.texts.len());
            match transport.send(request).await {
                Ok(response) => CommandReply::Batch(response),
                Err(e) => {
                    crate::translation::error::helpers::trace_error(&e);
                    CommandReply::Batch(BatchResponse::failure(&e))
                }
            }
        }
    }
}
