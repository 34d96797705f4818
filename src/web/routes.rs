//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::handlers::*;
use crate::web::types::AppState;

/// 创建路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/message", post(message))
        .route("/api/translate-batch", post(translate_batch))
        .route("/api/translate-page", post(translate_page))
}
