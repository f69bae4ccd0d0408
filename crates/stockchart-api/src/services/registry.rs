//! 공유 시리즈 레지스트리.
//!
//! 모든 클라이언트가 공유하는 단일 시리즈 목록과 색상 커서를 소유합니다.
//! 목록, 대기 중인 라벨, 색상 커서는 하나의 뮤텍스로 보호되며,
//! 변경과 그에 따른 브로드캐스트는 같은 임계 구역 안에서 일어납니다.
//! 따라서 새 클라이언트는 `load` 스냅샷 이후의 변경을 정확히 한 번씩 받습니다.
//!
//! 잠금 순서: 레지스트리 → 허브.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use stockchart_core::{ColorCycle, PendingSeries, SeriesRecord};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::metrics::set_series_count;
use crate::websocket::hub::SharedBroadcastHub;
use crate::websocket::messages::ServerMessage;

/// 제거 성공 시 요청자에게 보내는 안내 문구.
pub const SERIES_REMOVED: &str = "Series removed";

/// 레지스트리 에러.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// 이미 존재하거나 추가 진행 중인 라벨
    #[error("Stock is already in seriesList")]
    Duplicate(String),
}

#[derive(Debug)]
struct RegistryState {
    series: Vec<SeriesRecord>,
    pending: HashSet<String>,
    colors: ColorCycle,
}

/// 시리즈 레지스트리.
pub struct SeriesRegistry {
    state: Mutex<RegistryState>,
    hub: SharedBroadcastHub,
}

impl SeriesRegistry {
    /// 빈 레지스트리 생성.
    pub fn new(colors: ColorCycle, hub: SharedBroadcastHub) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                series: Vec::new(),
                pending: HashSet::new(),
                colors,
            }),
            hub,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 라벨을 예약합니다.
    ///
    /// 등록된 시리즈와 진행 중인 추가 작업 모두와 비교하므로
    /// 같은 라벨의 동시 추가 중 하나만 성공합니다.
    /// 반환된 예약은 [`append`](Self::append)로 확정되지 않고 drop되면 해제됩니다.
    pub fn reserve(self: &Arc<Self>, label: &str) -> Result<LabelReservation, RegistryError> {
        let mut state = self.lock();
        if state.pending.contains(label) || state.series.iter().any(|s| s.label == label) {
            return Err(RegistryError::Duplicate(label.to_string()));
        }
        state.pending.insert(label.to_string());
        debug!(%label, "Label reserved");

        Ok(LabelReservation {
            registry: Arc::clone(self),
            label: label.to_string(),
            committed: false,
        })
    }

    fn release(&self, label: &str) {
        if self.lock().pending.remove(label) {
            debug!(%label, "Label reservation released");
        }
    }

    /// 예약된 시리즈를 추가합니다.
    ///
    /// 색상을 할당하고 목록 끝에 추가한 뒤 `add`를 브로드캐스트합니다.
    pub fn append(&self, mut reservation: LabelReservation, pending: PendingSeries) -> SeriesRecord {
        debug_assert_eq!(reservation.label, pending.label);

        let mut state = self.lock();
        state.pending.remove(&reservation.label);
        let color = state.colors.next_color().to_string();
        let record = pending.with_color(color);
        state.series.push(record.clone());
        reservation.committed = true;

        let delivered = self.hub.broadcast(ServerMessage::Add(record.clone()));
        set_series_count(state.series.len());
        info!(
            symbol = %record.symbol,
            label = %record.label,
            color = %record.color,
            delivered,
            "Series added"
        );

        record
    }

    /// 라벨이 일치하는 첫 시리즈를 제거합니다.
    ///
    /// 제거되면 요청 세션에 [`SERIES_REMOVED`]를 먼저 넣고 `remove`를
    /// 브로드캐스트한 뒤 `true`를 반환합니다.
    pub fn remove(&self, requester: &str, label: &str) -> bool {
        let mut state = self.lock();
        let Some(index) = state.series.iter().position(|s| s.label == label) else {
            return false;
        };
        state.series.remove(index);

        if let Err(e) = self
            .hub
            .send_to(requester, ServerMessage::Message(SERIES_REMOVED.to_string()))
        {
            debug!(session_id = %requester, error = %e, "Remove confirmation not delivered");
        }
        let delivered = self.hub.broadcast(ServerMessage::Remove(label.to_string()));
        set_series_count(state.series.len());
        info!(%label, delivered, "Series removed");
        true
    }

    /// 현재 목록의 복사본.
    pub fn snapshot(&self) -> Vec<SeriesRecord> {
        self.lock().series.clone()
    }

    /// 클라이언트를 허브에 등록하고 `load` 스냅샷을 첫 메시지로 넣습니다.
    pub fn attach(&self, session_id: &str) -> mpsc::Receiver<ServerMessage> {
        let state = self.lock();
        let rx = self.hub.register(session_id);
        if let Err(e) = self
            .hub
            .send_to(session_id, ServerMessage::Load(state.series.clone()))
        {
            warn!(%session_id, error = %e, "Failed to queue load snapshot");
        }
        rx
    }

    /// 라벨 존재 여부.
    pub fn contains(&self, label: &str) -> bool {
        self.lock().series.iter().any(|s| s.label == label)
    }

    /// 등록된 시리즈 수.
    pub fn len(&self) -> usize {
        self.lock().series.len()
    }

    /// 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 진행 중인 추가 작업의 라벨 예약.
#[derive(Debug)]
pub struct LabelReservation {
    registry: Arc<SeriesRegistry>,
    label: String,
    committed: bool,
}

impl LabelReservation {
    /// 예약된 라벨.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for LabelReservation {
    fn drop(&mut self) {
        if !self.committed {
            self.registry.release(&self.label);
        }
    }
}

impl std::fmt::Debug for SeriesRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::hub::create_broadcast_hub;
    use stockchart_core::{DisplayHints, SeriesPoint, DEFAULT_PALETTE};

    fn pending(symbol: &str, label: &str) -> PendingSeries {
        PendingSeries {
            symbol: symbol.to_string(),
            label: label.to_string(),
            points: vec![SeriesPoint::new(1_000, Some(1.0))],
            display: DisplayHints::default(),
        }
    }

    fn registry() -> Arc<SeriesRegistry> {
        Arc::new(SeriesRegistry::new(
            ColorCycle::default(),
            create_broadcast_hub(16),
        ))
    }

    fn add(registry: &Arc<SeriesRegistry>, symbol: &str, label: &str) -> SeriesRecord {
        let reservation = registry.reserve(label).unwrap();
        registry.append(reservation, pending(symbol, label))
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let registry = registry();
        add(&registry, "AAPL", "Apple");
        add(&registry, "MSFT", "Microsoft");
        add(&registry, "GOOG", "Alphabet");

        let labels: Vec<_> = registry.snapshot().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Apple", "Microsoft", "Alphabet"]);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let registry = registry();
        add(&registry, "AAPL", "Apple");

        assert_eq!(
            registry.reserve("Apple").unwrap_err(),
            RegistryError::Duplicate("Apple".to_string())
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_pending_reservation_blocks_duplicate() {
        let registry = registry();
        let first = registry.reserve("Apple").unwrap();

        assert!(registry.reserve("Apple").is_err());
        assert!(!registry.contains("Apple"));

        drop(first);
        assert!(registry.reserve("Apple").is_ok());
    }

    #[test]
    fn test_dropped_reservation_does_not_advance_color() {
        let registry = registry();
        drop(registry.reserve("Apple").unwrap());

        let record = add(&registry, "MSFT", "Microsoft");
        assert_eq!(record.color, DEFAULT_PALETTE[0]);
    }

    #[test]
    fn test_color_cycles_and_survives_removal() {
        let registry = registry();
        let colors: Vec<_> = (0..7)
            .map(|i| add(&registry, "X", &format!("Company {}", i)).color)
            .collect();

        assert_eq!(colors[0], DEFAULT_PALETTE[0]);
        assert_eq!(colors[5], DEFAULT_PALETTE[5]);
        assert_eq!(colors[6], DEFAULT_PALETTE[0]);

        assert!(registry.remove("session-1", "Company 6"));
        let next = add(&registry, "Y", "Another");
        assert_eq!(next.color, DEFAULT_PALETTE[1]);
    }

    #[test]
    fn test_remove() {
        let registry = registry();
        add(&registry, "AAPL", "Apple");
        add(&registry, "MSFT", "Microsoft");

        assert!(registry.remove("session-1", "Apple"));
        assert_eq!(registry.len(), 1);

        assert!(!registry.remove("session-1", "Apple"));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Microsoft"));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let registry = registry();
        add(&registry, "AAPL", "Apple");

        let snapshot = registry.snapshot();
        registry.remove("session-1", "Apple");

        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_attach_sends_load_before_later_mutations() {
        let registry = registry();
        add(&registry, "AAPL", "Apple");

        let mut rx = registry.attach("session-1");
        add(&registry, "MSFT", "Microsoft");

        match rx.try_recv().unwrap() {
            ServerMessage::Load(series) => {
                assert_eq!(series.len(), 1);
                assert_eq!(series[0].label, "Apple");
            }
            other => panic!("expected load, got {:?}", other),
        }
        match rx.try_recv().unwrap() {
            ServerMessage::Add(record) => assert_eq!(record.label, "Microsoft"),
            other => panic!("expected add, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_remove_confirms_to_requester_before_broadcast() {
        let registry = registry();
        add(&registry, "AAPL", "Apple");
        let mut requester = registry.attach("requester");
        let mut other = registry.attach("other");
        requester.try_recv().unwrap();
        other.try_recv().unwrap();

        assert!(registry.remove("requester", "Apple"));

        assert_eq!(
            requester.try_recv().unwrap(),
            ServerMessage::Message(SERIES_REMOVED.to_string())
        );
        assert_eq!(
            requester.try_recv().unwrap(),
            ServerMessage::Remove("Apple".to_string())
        );
        assert_eq!(
            other.try_recv().unwrap(),
            ServerMessage::Remove("Apple".to_string())
        );
        assert!(other.try_recv().is_err());
    }

    #[test]
    fn test_remove_missing_sends_nothing() {
        let registry = registry();
        let mut requester = registry.attach("requester");
        requester.try_recv().unwrap();

        assert!(!registry.remove("requester", "Apple"));
        assert!(requester.try_recv().is_err());
    }
}
