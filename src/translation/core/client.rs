//! Gemini 端点回退客户端
//!
//! 按固定顺序依次尝试各个模型端点，直到某个端点返回成功。
//! 认证失败立即终止，其余失败继续尝试下一个端点。

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::translation::config::{constants, TranslationConfig};
use crate::translation::core::parser::parse_translations;
use crate::translation::core::prompt::build_prompt;
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::messages::{BatchRequest, BatchResponse, BatchTransport};

/// 端点描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointVariant {
    pub url: String,
    pub model: String,
}

impl EndpointVariant {
    /// 由 API 基础地址和模型名构造 `generateContent` 端点
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            url: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            model: model.to_string(),
        }
    }

    /// 默认的端点列表
    pub fn defaults() -> Vec<Self> {
        constants::DEFAULT_MODELS
            .iter()
            .map(|model| Self::new(constants::DEFAULT_API_BASE_URL, model))
            .collect()
    }
}

/// Gemini 客户端
pub struct GeminiClient {
    client: Client,
    variants: Vec<EndpointVariant>,
    stats: ClientStats,
}

impl GeminiClient {
    /// 根据配置创建客户端
    pub fn new(config: &TranslationConfig) -> TranslationResult<Self> {
        let variants = config
            .models
            .iter()
            .map(|model| EndpointVariant::new(&config.api_base_url, model))
            .collect();

        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Self::build(builder, variants)
    }

    /// 使用指定端点列表创建客户端
    pub fn with_variants(variants: Vec<EndpointVariant>) -> TranslationResult<Self> {
        Self::build(Client::builder(), variants)
    }

    fn build(
        builder: reqwest::ClientBuilder,
        variants: Vec<EndpointVariant>,
    ) -> TranslationResult<Self> {
        if variants.is_empty() {
            return Err(helpers::config_error("至少需要一个API端点"));
        }

        let client = builder
            .build()
            .map_err(|e| helpers::config_error(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            variants,
            stats: ClientStats::default(),
        })
    }

    /// 端点列表
    pub fn variants(&self) -> &[EndpointVariant] {
        &self.variants
    }

    pub fn get_stats(&self) -> &ClientStats {
        &self.stats
    }

    /// 翻译一个批次
    ///
    /// 返回的译文数量总是等于 `texts.len()`。空输入不发起任何请求。
    pub async fn translate_batch(
        &self,
        texts: &[String],
        credential: &str,
    ) -> TranslationResult<Vec<String>> {
        if texts.is_empty() {
            tracing::debug!("没有需要翻译的文本");
            return Ok(Vec::new());
        }

        let prompt = build_prompt(texts);
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let total = self.variants.len();
        let mut last_error = None;

        for (index, variant) in self.variants.iter().enumerate() {
            tracing::info!(
                "请求翻译端点 {}/{}: {} ({} 条文本)",
                index + 1,
                total,
                variant.model,
                texts.len()
            );
            self.stats.attempts.fetch_add(1, Ordering::Relaxed);

            match self.call_variant(variant, &body, credential).await {
                Ok(raw) => {
                    tracing::debug!("端点 {} 返回 {} 字节", variant.model, raw.len());
                    self.stats.successes.fetch_add(1, Ordering::Relaxed);
                    return Ok(parse_translations(&raw, texts.len()));
                }
                Err(error @ TranslationError::Authentication { .. }) => {
                    tracing::error!("认证失败，停止尝试其他端点: {}", error);
                    return Err(error);
                }
                Err(error) => {
                    if error.is_endpoint_unavailable() {
                        tracing::warn!("端点 {} 不可用: {}", variant.model, error);
                    } else {
                        tracing::warn!("端点 {} 请求失败: {}", variant.model, error);
                    }
                    if index + 1 < total {
                        self.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
                    }
                    last_error = Some(error);
                }
            }
        }

        let last_error =
            last_error.unwrap_or_else(|| helpers::internal_error("没有可用的API端点"));
        Err(TranslationError::EndpointsExhausted {
            attempted: total,
            last_error: Box::new(last_error),
        })
    }

    /// 向单个端点发送请求，返回模型输出的原始文本
    async fn call_variant(
        &self,
        variant: &EndpointVariant,
        body: &Value,
        credential: &str,
    ) -> TranslationResult<String> {
        let response = self
            .client
            .post(&variant.url)
            .header(constants::API_KEY_HEADER, credential)
            .json(body)
            .send()
            .await
            .map_err(|e| TranslationError::from(e).with_context(&variant.model))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TranslationError::from(e).with_context(&variant.model))?;

        if !status.is_success() {
            return Err(status_error(status, &text, &variant.model));
        }

        let envelope: Value = serde_json::from_str(&text).map_err(|e| {
            TranslationError::ParseError(format!("响应不是有效的JSON ({}): {}", variant.model, e))
        })?;

        Ok(envelope
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

/// 将非成功状态码转换为错误
fn status_error(status: StatusCode, body: &str, model: &str) -> TranslationError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TranslationError::Authentication {
            status: status.as_u16(),
            message,
        },
        _ => TranslationError::ApiError {
            status: status.as_u16(),
            message,
            model: model.to_string(),
        },
    }
}

#[async_trait]
impl BatchTransport for GeminiClient {
    async fn send(&self, request: BatchRequest) -> TranslationResult<BatchResponse> {
        match self
            .translate_batch(&request.texts, &request.credential)
            .await
        {
            Ok(translations) => Ok(BatchResponse::success(translations)),
            Err(error) => {
                helpers::trace_error(&error);
                Ok(BatchResponse::failure(&error))
            }
        }
    }
}

/// 客户端统计
#[derive(Debug, Default)]
pub struct ClientStats {
    /// 发出的请求数
    pub attempts: AtomicUsize,
    /// 成功的批次数
    pub successes: AtomicUsize,
    /// 回退到下一个端点的次数
    pub fallbacks: AtomicUsize,
}

impl ClientStats {
    pub fn get_attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn get_successes(&self) -> usize {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn get_fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_url() {
        let variant = EndpointVariant::new("https://example.com/v1beta/", "gemini-2.5-flash");
        assert_eq!(
            variant.url,
            "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(variant.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_default_variants_order() {
        let models: Vec<String> = EndpointVariant::defaults()
            .into_iter()
            .map(|variant| variant.model)
            .collect();
        assert_eq!(
            models,
            vec![
                "gemini-2.5-flash",
                "gemini-2.0-flash",
                "gemini-2.5-pro",
                "gemini-1.5-pro"
            ]
        );
    }

    #[test]
    fn test_status_error_classification() {
        let auth = status_error(StatusCode::FORBIDDEN, "", "m");
        assert!(matches!(auth, TranslationError::Authentication { status: 403, .. }));

        let missing = status_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"message":"model not found"}}"#,
            "m",
        );
        match missing {
            TranslationError::ApiError { status, message, .. } => {
                assert_eq!(status, 404);
                assert_eq!(message, "model not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let server = status_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>", "m");
        assert!(server.to_string().contains("Internal Server Error"));
    }

    #[test]
    fn test_requires_variants() {
        assert!(GeminiClient::with_variants(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_empty_input_skips_network() {
        let client = GeminiClient::with_variants(vec![EndpointVariant::new(
            "http://127.0.0.1:9",
            "unreachable",
        )])
        .unwrap();

        let result = client.translate_batch(&[], "key").await.unwrap();
        assert!(result.is_empty());
        assert_eq!(client.get_stats().get_attempts(), 0);
    }
}
