//! WebSocket 클라이언트 관리 및 메시지 브로드캐스트.
//!
//! 각 세션은 크기가 제한된 송신 큐를 하나씩 가집니다. 큐에 넣는 작업은
//! 블로킹하지 않으므로 느린 클라이언트가 다른 클라이언트의 전달을 막지 않습니다.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::messages::ServerMessage;
use crate::metrics::record_dropped_delivery;

/// 단일 세션 전달 실패.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("알 수 없는 세션: {0}")]
    UnknownSession(String),
    #[error("송신 큐가 가득 참")]
    QueueFull,
    #[error("세션이 종료됨")]
    Closed,
}

/// 클라이언트 세션 정보.
#[derive(Debug)]
pub struct ClientSession {
    /// 세션 ID
    pub id: String,
    /// 송신 큐
    tx: mpsc::Sender<ServerMessage>,
}

impl ClientSession {
    /// 메시지를 송신 큐에 넣습니다.
    fn deliver(&self, message: ServerMessage) -> Result<(), DeliveryError> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// 브로드캐스트 허브.
///
/// 연결된 모든 WebSocket 클라이언트를 관리하고 메시지를 전달합니다.
pub struct BroadcastHub {
    /// 클라이언트 세션 목록
    sessions: RwLock<HashMap<String, ClientSession>>,
    /// 세션별 송신 큐 크기
    capacity: usize,
}

impl BroadcastHub {
    /// 새로운 허브 생성.
    ///
    /// # Arguments
    ///
    /// * `capacity` - 세션별 송신 큐 크기 (최소 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ClientSession>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ClientSession>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 새 클라이언트 세션 등록.
    ///
    /// # Returns
    ///
    /// 세션의 송신 큐 수신기
    pub fn register(&self, session_id: &str) -> mpsc::Receiver<ServerMessage> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let session = ClientSession {
            id: session_id.to_string(),
            tx,
        };
        self.write().insert(session_id.to_string(), session);
        rx
    }

    /// 클라이언트 세션 제거.
    pub fn unregister(&self, session_id: &str) -> bool {
        self.write().remove(session_id).is_some()
    }

    /// 특정 세션에만 메시지 전송.
    pub fn send_to(&self, session_id: &str, message: ServerMessage) -> Result<(), DeliveryError> {
        let sessions = self.read();
        let session = sessions
            .get(session_id)
            .ok_or_else(|| DeliveryError::UnknownSession(session_id.to_string()))?;
        session.deliver(message)
    }

    /// 메시지 브로드캐스트.
    ///
    /// 호출 시점의 세션 목록을 복사한 뒤 각 세션에 독립적으로 전달합니다.
    /// 실패한 세션은 로그만 남기고 건너뜁니다.
    ///
    /// # Returns
    ///
    /// 전달에 성공한 세션 수
    pub fn broadcast(&self, message: ServerMessage) -> usize {
        let targets: Vec<(String, mpsc::Sender<ServerMessage>)> = self
            .read()
            .values()
            .map(|s| (s.id.clone(), s.tx.clone()))
            .collect();

        let mut delivered = 0;
        for (session_id, tx) in targets {
            match tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        session_id = %session_id,
                        kind = message.kind(),
                        "Client queue full, dropping broadcast"
                    );
                    record_dropped_delivery();
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(session_id = %session_id, "Skipping closed session");
                }
            }
        }

        debug!(kind = message.kind(), delivered, "Broadcast sent");
        delivered
    }

    /// 연결된 클라이언트 수.
    pub fn client_count(&self) -> usize {
        self.read().len()
    }

    /// 세션별 송신 큐 크기.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(256)
    }
}

/// 공유 가능한 허브 타입.
pub type SharedBroadcastHub = Arc<BroadcastHub>;

/// 새로운 공유 허브 생성.
pub fn create_broadcast_hub(capacity: usize) -> SharedBroadcastHub {
    Arc::new(BroadcastHub::new(capacity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_unregister() {
        let hub = BroadcastHub::new(8);

        let _rx = hub.register("session-1");
        assert_eq!(hub.client_count(), 1);

        assert!(hub.unregister("session-1"));
        assert!(!hub.unregister("session-1"));
        assert_eq!(hub.client_count(), 0);
    }

    #[test]
    fn test_broadcast_reaches_every_session() {
        let hub = BroadcastHub::new(8);
        let mut rx1 = hub.register("session-1");
        let mut rx2 = hub.register("session-2");

        let delivered = hub.broadcast(ServerMessage::Remove("Apple".to_string()));

        assert_eq!(delivered, 2);
        assert_eq!(
            rx1.try_recv().unwrap(),
            ServerMessage::Remove("Apple".to_string())
        );
        assert_eq!(
            rx2.try_recv().unwrap(),
            ServerMessage::Remove("Apple".to_string())
        );
    }

    #[test]
    fn test_send_to_is_targeted() {
        let hub = BroadcastHub::new(8);
        let mut rx1 = hub.register("session-1");
        let mut rx2 = hub.register("session-2");

        hub.send_to("session-1", ServerMessage::error("nope")).unwrap();

        assert_eq!(rx1.try_recv().unwrap(), ServerMessage::error("nope"));
        assert!(rx2.try_recv().is_err());
        assert_eq!(
            hub.send_to("missing", ServerMessage::error("x")),
            Err(DeliveryError::UnknownSession("missing".to_string()))
        );
    }

    #[test]
    fn test_closed_session_is_skipped() {
        let hub = BroadcastHub::new(8);
        let rx1 = hub.register("session-1");
        let mut rx2 = hub.register("session-2");
        drop(rx1);

        let delivered = hub.broadcast(ServerMessage::Message("hi".to_string()));

        assert_eq!(delivered, 1);
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_full_queue_does_not_block_others() {
        let hub = BroadcastHub::new(1);
        let _slow = hub.register("slow");
        let mut fast = hub.register("fast");

        assert_eq!(hub.broadcast(ServerMessage::Message("1".to_string())), 2);
        fast.try_recv().unwrap();

        // slow 세션의 큐는 가득 참
        assert_eq!(hub.broadcast(ServerMessage::Message("2".to_string())), 1);
        assert_eq!(
            fast.try_recv().unwrap(),
            ServerMessage::Message("2".to_string())
        );
    }

    #[test]
    fn test_per_session_order_preserved() {
        let hub = BroadcastHub::new(8);
        let mut rx = hub.register("session-1");

        hub.broadcast(ServerMessage::Remove("a".to_string()));
        hub.send_to("session-1", ServerMessage::Message("b".to_string()))
            .unwrap();
        hub.broadcast(ServerMessage::Remove("c".to_string()));

        assert_eq!(rx.try_recv().unwrap(), ServerMessage::Remove("a".to_string()));
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::Message("b".to_string()));
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::Remove("c".to_string()));
    }
}
