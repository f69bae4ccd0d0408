//! 헬스 체크 endpoint.
//!
//! - `GET /health`: 프로세스 생존 확인 (항상 `OK`)
//! - `GET /health/ready`: 세션과 공유 시리즈 현황. 종료 중에는 503

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// 준비 상태 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// "ready" 또는 "shutting_down"
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    /// RFC 3339
    pub timestamp: String,
    pub sessions: SessionStats,
    pub series: SeriesStats,
}

/// WebSocket 세션 현황.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStats {
    pub connected: usize,
    pub queue_capacity: usize,
}

/// 공유 시리즈 목록 현황.
#[derive(Debug, Serialize, Deserialize)]
pub struct SeriesStats {
    pub count: usize,
    /// 삽입 순서대로의 회사명
    pub labels: Vec<String>,
}

impl ReadinessResponse {
    fn collect(state: &AppState) -> Self {
        let labels: Vec<String> = state
            .registry
            .snapshot()
            .into_iter()
            .map(|record| record.label)
            .collect();
        let status = if state.shutdown.is_cancelled() {
            "shutting_down"
        } else {
            "ready"
        };

        Self {
            status: status.to_string(),
            version: state.version.clone(),
            uptime_secs: state.uptime_secs(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            sessions: SessionStats {
                connected: state.client_count(),
                queue_capacity: state.hub.capacity(),
            },
            series: SeriesStats {
                count: labels.len(),
                labels,
            },
        }
    }
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = ReadinessResponse::collect(&state);
    let code = if state.shutdown.is_cancelled() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(response))
}

/// `/health` 아래에 중첩할 라우터.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
