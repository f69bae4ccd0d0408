//! 애플리케이션 공유 상태.
//!
//! 모든 핸들러에서 공유되는 상태를 정의합니다.
//! Arc로 감싸서 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stockchart_core::{AppConfig, ColorCycle, DisplayHints};
use stockchart_data::{MarkitClient, SeriesProvider};
use tokio_util::sync::CancellationToken;

use crate::error::StartupError;
use crate::services::registry::SeriesRegistry;
use crate::websocket::dispatcher::Dispatcher;
use crate::websocket::hub::{create_broadcast_hub, SharedBroadcastHub};

/// 애플리케이션 공유 상태.
pub struct AppState {
    /// 서버 버전
    pub version: String,

    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,

    /// 세션 허브
    pub hub: SharedBroadcastHub,

    /// 공유 시리즈 레지스트리
    pub registry: Arc<SeriesRegistry>,

    /// 요청 처리기
    pub dispatcher: Dispatcher,

    /// 서버 종료 토큰. 취소되면 열린 WebSocket 세션이 닫힙니다.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// 새 상태 생성.
    ///
    /// # Arguments
    ///
    /// * `provider` - 외부 데이터 제공자
    /// * `colors` - 시리즈 색상 순환기
    /// * `client_buffer` - 세션별 송신 큐 크기
    pub fn new(provider: Arc<dyn SeriesProvider>, colors: ColorCycle, client_buffer: usize) -> Self {
        let hub = create_broadcast_hub(client_buffer);
        let registry = Arc::new(SeriesRegistry::new(colors, Arc::clone(&hub)));
        let dispatcher = Dispatcher::new(Arc::clone(&registry), Arc::clone(&hub), provider);

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            hub,
            registry,
            dispatcher,
            shutdown: CancellationToken::new(),
        }
    }

    /// 설정에서 Markit 제공자를 사용하는 상태 생성.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let display = DisplayHints::with_decimals(config.series.value_decimals);
        let provider = MarkitClient::new(&config.provider, display)?;
        let colors = ColorCycle::new(config.series.palette.clone())?;

        Ok(Self::new(
            Arc::new(provider),
            colors,
            config.websocket.client_buffer,
        ))
    }

    /// 종료 토큰 교체.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 연결된 클라이언트 수.
    pub fn client_count(&self) -> usize {
        self.hub.client_count()
    }

    /// 등록된 시리즈 수.
    pub fn series_count(&self) -> usize {
        self.registry.len()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 외부 호출 없이 모든 조회가 `No data for that name`으로 끝나는 제공자를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use async_trait::async_trait;
    use stockchart_core::PendingSeries;
    use stockchart_data::GatewayError;

    struct NoDataProvider;

    #[async_trait]
    impl SeriesProvider for NoDataProvider {
        async fn search(&self, _query: &str) -> stockchart_data::Result<String> {
            Ok("[]".to_string())
        }

        async fn fetch_series(
            &self,
            _symbol: &str,
            _label: &str,
        ) -> stockchart_data::Result<PendingSeries> {
            Err(GatewayError::NoData)
        }
    }

    AppState::new(Arc::new(NoDataProvider), ColorCycle::default(), 16)
}
