//! HTTP 라우트.

pub mod health;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;
use crate::websocket::websocket_router;

pub use health::{health_check, health_ready, health_router, ReadinessResponse};

/// 헬스 체크와 WebSocket 엔드포인트를 합친 라우터 생성.
pub fn create_app_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .merge(websocket_router())
}
