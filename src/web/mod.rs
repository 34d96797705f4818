//! Web 服务器模块
//!
//! 通过 HTTP 提供批次翻译、整页翻译与命令入口

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::WebConfig;
pub use routes::create_routes;
pub use types::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::core::MazegakiError;
use crate::translation::{GeminiClient, TranslationConfig};

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
    translation_config: TranslationConfig,
}

impl WebServer {
    pub fn new(config: WebConfig, translation_config: TranslationConfig) -> Self {
        Self {
            config,
            translation_config,
        }
    }

    /// 启动 Web 服务器
    pub async fn start(&self) -> Result<(), MazegakiError> {
        let app = create_router(&self.translation_config)?;

        let listener = tokio::net::TcpListener::bind(self.config.address())
            .await
            .map_err(|e| MazegakiError::new(&format!("Failed to bind server: {}", e)))?;

        tracing::info!("Web server starting at http://{}", self.config.address());

        axum::serve(listener, app)
            .await
            .map_err(|e| MazegakiError::new(&format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// 创建路由器
pub fn create_router(translation_config: &TranslationConfig) -> Result<Router, MazegakiError> {
    translation_config.validate()?;
    let client = GeminiClient::new(translation_config)?;

    let app_state = Arc::new(AppState {
        config: translation_config.clone(),
        client: Arc::new(client),
    });

    Ok(create_routes()
        .with_state(app_state)
        .layer(CorsLayer::permissive()))
}
