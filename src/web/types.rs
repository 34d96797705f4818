//! Web 模块的数据类型定义

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::translation::{GeminiClient, RunReport, TranslationConfig};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub config: TranslationConfig,
    pub client: Arc<GeminiClient>,
}

/// 整页翻译请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatePageRequest {
    pub html: String,
    pub ratio: Option<u8>,
    pub api_key: Option<String>,
    pub seed: Option<u64>,
}

/// 整页翻译响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatePageResponse {
    pub html: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub models: Vec<String>,
}
