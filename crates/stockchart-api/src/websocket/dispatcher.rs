//! 클라이언트 요청 처리기.
//!
//! 수신한 텍스트 프레임을 검증하고 연산별로 라우팅합니다.
//! 응답과 에러는 요청한 세션에만 전달되고, 레지스트리 변경은
//! [`SeriesRegistry`]가 모든 세션에 브로드캐스트합니다.

use std::sync::Arc;

use stockchart_data::SeriesProvider;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::hub::SharedBroadcastHub;
use super::messages::{AddSeriesRequest, ClientRequest, ServerMessage};
use crate::error::DispatchError;
use crate::metrics::record_operation;
use crate::services::registry::SeriesRegistry;

/// 요청 처리기.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<SeriesRegistry>,
    hub: SharedBroadcastHub,
    provider: Arc<dyn SeriesProvider>,
}

impl Dispatcher {
    /// 새 처리기 생성.
    pub fn new(
        registry: Arc<SeriesRegistry>,
        hub: SharedBroadcastHub,
        provider: Arc<dyn SeriesProvider>,
    ) -> Self {
        Self {
            registry,
            hub,
            provider,
        }
    }

    /// 세션을 등록합니다. 첫 메시지는 항상 `load` 스냅샷입니다.
    pub fn connect(&self, session_id: &str) -> mpsc::Receiver<ServerMessage> {
        self.registry.attach(session_id)
    }

    /// 세션을 해제합니다. 이후 브로드캐스트 대상에서 빠집니다.
    pub fn disconnect(&self, session_id: &str) {
        if !self.hub.unregister(session_id) {
            debug!(%session_id, "Session already unregistered");
        }
    }

    /// 텍스트 프레임 하나를 별도 태스크에서 처리합니다.
    ///
    /// 태스크는 연결 수명과 무관하게 끝까지 실행되므로, 요청 세션이
    /// 먼저 끊겨도 진행 중인 `add`는 확정되고 다른 세션에 브로드캐스트됩니다.
    pub fn spawn_request(&self, session_id: &str, text: String) -> JoinHandle<()> {
        let dispatcher = self.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            dispatcher.handle_text(&session_id, &text).await;
        })
    }

    /// 텍스트 프레임 하나를 처리하고 응답을 요청 세션에 넣습니다.
    pub async fn handle_text(&self, session_id: &str, text: &str) {
        let reply = match self.dispatch(session_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(%session_id, error = %e, kind = e.kind(), "Request failed");
                Some(ServerMessage::error(e.to_string()))
            }
        };

        if let Some(message) = reply {
            if let Err(e) = self.hub.send_to(session_id, message) {
                debug!(%session_id, error = %e, "Reply not delivered");
            }
        }
    }

    /// 요청을 검증하고 실행합니다.
    ///
    /// # Returns
    ///
    /// 요청 세션에만 보낼 응답. 이미 큐에 넣은 경우(`add`, `remove` 성공)는 `None`입니다.
    pub async fn dispatch(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<Option<ServerMessage>, DispatchError> {
        let request = match ClientRequest::from_json(text) {
            Ok(request) => request,
            Err(e) => {
                record_operation("unknown", e.kind());
                return Err(e);
            }
        };
        let operation = request.operation().as_str();

        let result = match request {
            ClientRequest::Lookup(query) => self.lookup(&query).await.map(Some),
            ClientRequest::Add(add) => self.add(add).await.map(|_| None),
            ClientRequest::Remove(label) => self.remove(session_id, &label).map(|_| None),
        };

        match &result {
            Ok(_) => record_operation(operation, "ok"),
            Err(e) => record_operation(operation, e.kind()),
        }
        result
    }

    #[instrument(skip(self))]
    async fn lookup(&self, query: &str) -> Result<ServerMessage, DispatchError> {
        let body = self.provider.search(query).await?;
        Ok(ServerMessage::Lookup(body))
    }

    #[instrument(skip(self, request), fields(symbol = %request.symbol, label = %request.name))]
    async fn add(&self, request: AddSeriesRequest) -> Result<(), DispatchError> {
        let reservation = self.registry.reserve(&request.name)?;
        let pending = self
            .provider
            .fetch_series(&request.symbol, reservation.label())
            .await?;
        self.registry.append(reservation, pending);
        Ok(())
    }

    fn remove(&self, session_id: &str, label: &str) -> Result<(), DispatchError> {
        if self.registry.remove(session_id, label) {
            Ok(())
        } else {
            Err(DispatchError::NotFound)
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("clients", &self.hub.client_count())
            .finish()
    }
}
