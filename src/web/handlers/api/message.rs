use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, State},
    response::Json,
};

use crate::translation::{handle_command, Command, CommandReply};
use crate::web::types::AppState;

/// 命令入口
///
/// 接受 `{"action": "startTranslation"}` 与
/// `{"action": "translateBatch", "texts": [...], "apiKey": "..."}`。
pub async fn message(
    State(state): State<Arc<AppState>>,
    ExtractJson(command): ExtractJson<Command>,
) -> Json<CommandReply> {
    if let Command::TranslateBatch(request) = &command {
        tracing::debug!("收到批次翻译命令: {} 条文本", request.texts.len());
    }
    Json(handle_command(state.client.as_ref(), command).await)
}
