//! 공유 주식 차트 동기화 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 시리즈 목록을 모든 클라이언트와 동기화하는 WebSocket 서버
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: HTTP 엔드포인트
//! - [`services`]: 공유 시리즈 레지스트리
//! - [`websocket`]: 메시지 처리 및 브로드캐스트
//! - [`metrics`]: Prometheus 메트릭 수집

pub mod error;
pub mod metrics;
pub mod routes;
pub mod services;
pub mod state;
pub mod websocket;

pub use error::{DispatchError, StartupError};
pub use metrics::setup_metrics_recorder;
pub use routes::create_app_router;
pub use services::{RegistryError, SeriesRegistry};
pub use state::AppState;
pub use websocket::{
    create_broadcast_hub, websocket_handler, websocket_router, BroadcastHub, ClientRequest,
    Dispatcher, ServerMessage, WsError,
};

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
