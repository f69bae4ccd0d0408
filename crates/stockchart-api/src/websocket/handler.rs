//! WebSocket 연결 handler.
//!
//! Axum WebSocket 엔드포인트 및 세션 수명 관리.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::metrics::{decrement_websocket_connections, increment_websocket_connections};
use crate::state::AppState;

/// WebSocket 업그레이드 핸들러.
///
/// # 엔드포인트
///
/// `GET /`, `GET /ws`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// WebSocket 연결 처리.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = uuid::Uuid::new_v4().to_string();
    info!(%session_id, "WebSocket connected");

    increment_websocket_connections();

    // 등록과 동시에 load 스냅샷이 큐에 들어감
    let mut outbound = state.dispatcher.connect(&session_id);

    let (mut sender, mut receiver) = socket.split();

    // 송신 큐 → 소켓
    let session_id_clone = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let json = match message.to_json() {
                Ok(json) => json,
                Err(e) => {
                    warn!(session_id = %session_id_clone, error = %e, "Failed to encode message");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // 소켓 → 처리기. 요청은 연결과 분리된 태스크에서 끝까지 실행됨
    let session_id_clone = session_id.clone();
    let dispatcher = state.dispatcher.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    dispatcher.spawn_request(&session_id_clone, text.as_str().to_owned());
                }
                Ok(Message::Binary(_)) => {
                    warn!(session_id = %session_id_clone, "Binary messages not supported");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    debug!(session_id = %session_id_clone, "Close message received");
                    break;
                }
                Err(e) => {
                    warn!(session_id = %session_id_clone, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // 하나의 태스크가 종료되면 다른 것도 종료
    tokio::select! {
        _ = &mut receive_task => {
            debug!(%session_id, "Receive task ended");
            send_task.abort();
        }
        _ = &mut send_task => {
            debug!(%session_id, "Send task ended");
            receive_task.abort();
        }
        _ = state.shutdown.cancelled() => {
            debug!(%session_id, "Server shutting down");
            receive_task.abort();
            send_task.abort();
        }
    }

    state.dispatcher.disconnect(&session_id);

    decrement_websocket_connections();

    info!(%session_id, "WebSocket disconnected");
}

/// WebSocket 라우터 생성.
///
/// 루트 경로와 `/ws` 모두에서 업그레이드를 받습니다.
pub fn websocket_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(websocket_handler))
        .route("/ws", get(websocket_handler))
}
