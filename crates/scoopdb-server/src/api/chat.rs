use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use scoopdb_chat::{ChatMessage, GeminiClient};
use scoopdb_core::Product;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatReply {
    pub message: String,
}

/// `POST /api/v1/chat` — forward the conversation to the generative API
/// with the current product snapshot as context.
///
/// Chat failures surface as `upstream_error` and touch nothing else: the
/// product endpoints share no state with this handler beyond the pool.
pub(super) async fn converse(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "messages must be a non-empty array",
        ));
    }

    let Some(api_key) = state.config.gemini_api_key.as_deref() else {
        return Err(ApiError::new(
            req_id.0,
            "chat_unavailable",
            "chat is not configured on this deployment (GEMINI_API_KEY unset)",
        ));
    };

    let rows = scoopdb_db::list_products(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let snapshot: Vec<Product> = rows.into_iter().map(Into::into).collect();
    let context = scoopdb_chat::product_context(&snapshot);

    let client = GeminiClient::new(api_key, &state.config.chat_model, 30).map_err(|e| {
        tracing::error!(error = %e, "failed to build chat client");
        ApiError::new(req_id.0.clone(), "internal_error", "chat client unavailable")
    })?;

    let message = client
        .generate_reply(&request.messages, &context)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "chat upstream call failed");
            ApiError::new(
                req_id.0.clone(),
                "upstream_error",
                "the assistant could not answer right now",
            )
        })?;

    Ok(Json(ApiResponse {
        data: ChatReply { message },
        meta: ResponseMeta::new(req_id.0),
    }))
}
