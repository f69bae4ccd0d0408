//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! WebSocket 연결 수와 시리즈 연산 결과를 수집하고 `/metrics` 엔드포인트로 노출합니다.
//! 레코더가 설치되지 않은 상태(테스트 등)에서는 모든 기록이 무시됩니다.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`
///
/// # Errors
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

// ============================================================================
// WebSocket 메트릭
// ============================================================================

/// WebSocket 연결 수 증가.
pub fn increment_websocket_connections() {
    gauge!("websocket_connections_active").increment(1.0);
}

/// WebSocket 연결 수 감소.
pub fn decrement_websocket_connections() {
    gauge!("websocket_connections_active").decrement(1.0);
}

/// 큐 포화로 버려진 브로드캐스트 수 증가.
pub fn record_dropped_delivery() {
    counter!("broadcast_deliveries_dropped_total").increment(1);
}

// ============================================================================
// 시리즈 메트릭
// ============================================================================

/// 연산 결과 카운터 증가.
///
/// `outcome`은 성공 시 `"ok"`, 실패 시 에러 종류입니다.
pub fn record_operation(operation: &str, outcome: &str) {
    counter!(
        "series_operations_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 레지스트리 시리즈 수 설정.
pub fn set_series_count(count: usize) {
    gauge!("series_registry_size").set(count as f64);
}
