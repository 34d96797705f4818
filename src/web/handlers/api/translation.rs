//! 翻译相关API处理器

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, State},
    http::StatusCode,
    response::Json,
};
use tokio::runtime::Handle;
use tokio::task;

use crate::core::sampling_rng;
use crate::parsers::html::HtmlPage;
use crate::translation::{
    BatchRequest, BatchResponse, BatchTransport, EngineConfig, ErrorCategory, GeminiClient,
    RunSettings, TranslationError, TranslationResult, TranslationService,
};
use crate::web::types::{AppState, TranslatePageRequest, TranslatePageResponse};

type ApiError = (StatusCode, Json<serde_json::Value>);

/// 翻译一个批次
pub async fn translate_batch(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<BatchRequest>,
) -> Json<BatchResponse> {
    tracing::info!("批次翻译请求: {} 条文本", request.texts.len());

    let response = match state.client.send(request).await {
        Ok(response) => response,
        Err(e) => BatchResponse::failure(&e),
    };

    Json(response)
}

/// 翻译整页 HTML
///
/// DOM 不能跨线程，整个运行放在阻塞线程中完成。
pub async fn translate_page(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<TranslatePageRequest>,
) -> Result<Json<TranslatePageResponse>, ApiError> {
    let settings = RunSettings::new(
        request.api_key.or_else(|| state.config.api_key.clone()),
        request
            .ratio
            .unwrap_or(state.config.translation_ratio)
            .min(100),
    );
    let engine_config = EngineConfig::from(&state.config);
    let client = state.client.clone();
    let html = request.html;
    let seed = request.seed;

    tracing::info!("整页翻译请求: {} 字节", html.len());

    let result = task::spawn_blocking(move || {
        Handle::current().block_on(run_page_translation(
            client,
            engine_config,
            settings,
            html,
            seed,
        ))
    })
    .await
    .map_err(|e| {
        tracing::error!("翻译任务异常结束: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string(), None)
    })?;

    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::warn!("整页翻译失败: {}", e);
            let status = match e.category() {
                ErrorCategory::Authentication => StatusCode::UNAUTHORIZED,
                ErrorCategory::Input | ErrorCategory::Parsing => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err(error_response(status, &e.to_string(), Some(e.category())))
        }
    }
}

async fn run_page_translation(
    client: Arc<GeminiClient>,
    engine_config: EngineConfig,
    settings: RunSettings,
    html: String,
    seed: Option<u64>,
) -> TranslationResult<TranslatePageResponse> {
    let page = HtmlPage::from_bytes(html.as_bytes(), "utf-8").map_err(TranslationError::from)?;
    let service = TranslationService::new(client, engine_config);

    let mut rng = sampling_rng(seed);
    let outcome = service.start(&page, &settings, rng.as_mut()).await?;

    if outcome.report().map_or(false, |report| report.units_translated > 0) {
        page.inject_marker_styles();
    }

    Ok(TranslatePageResponse {
        html: page.to_html_string().map_err(TranslationError::from)?,
        outcome: outcome.name(),
        message: outcome.user_message(),
        report: outcome.report().cloned(),
    })
}

fn error_response(status: StatusCode, message: &str, category: Option<ErrorCategory>) -> ApiError {
    (
        status,
        Json(serde_json::json!({
            "error": message,
            "category": category,
        })),
    )
}
