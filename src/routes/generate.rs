//! POST /api/generate: the streaming inference proxy.
//!
//! An authenticated request gets a composed prompt, a round-robin pick from
//! the endpoint pool, and a relayed Ollama stream. Once the stream ends,
//! both turns of the exchange are persisted in the background.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio_stream::wrappers::ReceiverStream;

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::services::{ollama, relay};
use crate::utils::ip;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate", post(generate))
}

#[derive(Deserialize)]
struct GenerateQuery {
    #[serde(default)]
    reload_prompts: bool,
}

#[derive(Deserialize)]
struct GenerateBody {
    model: String,
    question: Option<String>,
    /// Raw prompt a client may send instead of `question`.
    prompt: Option<String>,
    #[serde(rename = "roomId")]
    room_id: Option<String>,
    /// Everything else is passed through to Ollama as generation options.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<GenerateQuery>,
    headers: HeaderMap,
    Json(body): Json<GenerateBody>,
) -> Response {
    if query.reload_prompts {
        state.prompts.reload();
    }

    let ip = ip::ip_info(&ip::client_ip(&headers));

    let question = body
        .question
        .clone()
        .or_else(|| body.prompt.clone())
        .unwrap_or_default();
    let final_prompt = state.prompts.compose(&body.model, &question);

    let endpoint = state.endpoints.next();
    let payload = ollama::build_payload(&body.model, &final_prompt, &body.extra);

    // A transport failure before any response means nothing was emitted and
    // nothing gets persisted.
    let upstream = match ollama::start_generate(&state.http, endpoint, &payload).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!("generate: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "Inference endpoint unreachable"})),
            )
                .into_response();
        }
    };

    let status = upstream.status();
    if !status.is_success() {
        let details = upstream.text().await.unwrap_or_default();
        tracing::error!("generate: upstream returned {}: {}", status, details);
        return (
            status,
            Json(json!({"error": "Inference request failed", "details": details})),
        )
            .into_response();
    }

    // Relay runs in its own task feeding the response body through a bounded
    // channel; persistence happens there after the caller has everything.
    let (tx, rx) = tokio::sync::mpsc::channel::<bytes::Bytes>(32);

    let pool = state.db.clone();
    let model = body.model.clone();
    let room_id = body.room_id.clone();
    tokio::spawn(async move {
        match relay::relay(upstream.bytes_stream(), tx).await {
            relay::RelayOutcome::Completed(answer) => {
                db::messages::record_exchange(
                    &pool,
                    &user,
                    room_id.as_deref(),
                    &model,
                    &question,
                    &answer,
                    &ip,
                    false,
                )
                .await;
            }
            relay::RelayOutcome::Aborted(answer) => {
                tracing::info!(
                    "generate: caller disconnected mid-stream, storing partial answer ({} chars)",
                    answer.len()
                );
                db::messages::record_exchange(
                    &pool,
                    &user,
                    room_id.as_deref(),
                    &model,
                    &question,
                    &answer,
                    &ip,
                    true,
                )
                .await;
            }
            relay::RelayOutcome::Failed { partial, error } => {
                tracing::error!(
                    "generate: upstream stream failed after {} chars: {}",
                    partial.len(),
                    error
                );
            }
        }
    });

    let body_stream = ReceiverStream::new(rx).map(Ok::<_, std::convert::Infallible>);

    match Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(body_stream))
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("generate: building response failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
