//! 공유 차트 동기화를 위한 WebSocket 서버.
//!
//! 모든 클라이언트는 하나의 시리즈 목록을 공유합니다. 한 클라이언트가
//! 시리즈를 추가하거나 제거하면 연결된 모든 클라이언트가 같은 변경을 받습니다.
//!
//! # 메시지 형식
//!
//! 모든 메시지는 JSON 텍스트 프레임입니다.
//!
//! ## 클라이언트 → 서버
//!
//! ```json
//! {"operation": "lookup", "data": "app"}
//! {"operation": "add", "data": {"symbol": "AAPL", "name": "Apple Inc"}}
//! {"operation": "remove", "data": "Apple Inc"}
//! ```
//!
//! ## 서버 → 클라이언트
//!
//! ```json
//! {"type": "load", "message": "[...]"}
//! {"type": "add", "message": "{...}"}
//! {"type": "remove", "message": "Apple Inc"}
//! {"type": "lookup", "message": "[...]"}
//! {"type": "message", "message": "Series removed"}
//! {"type": "error", "message": "Stock is already in seriesList"}
//! ```
//!
//! `load`와 `add`의 `message`는 시리즈 JSON을 한 번 더 문자열로 인코딩한 값입니다.

pub mod dispatcher;
pub mod handler;
pub mod hub;
pub mod messages;

pub use dispatcher::Dispatcher;
pub use handler::{websocket_handler, websocket_router};
pub use hub::{create_broadcast_hub, BroadcastHub, DeliveryError, SharedBroadcastHub};
pub use messages::{AddSeriesRequest, ClientRequest, Operation, ServerMessage, WsError};
