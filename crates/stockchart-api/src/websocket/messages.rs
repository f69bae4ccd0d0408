//! WebSocket 메시지 타입.
//!
//! 클라이언트-서버 간 교환되는 메시지 정의.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockchart_core::SeriesRecord;

use crate::error::DispatchError;

/// WebSocket 에러.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("직렬화 실패: {0}")]
    SerializationError(#[from] serde_json::Error),
}

// ==================== 클라이언트 → 서버 메시지 ====================

/// 클라이언트 연산 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// 종목 검색
    Lookup,
    /// 시리즈 추가
    Add,
    /// 시리즈 제거
    Remove,
}

impl Operation {
    /// 연산 이름에서 파싱.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "lookup" => Some(Operation::Lookup),
            "add" => Some(Operation::Add),
            "remove" => Some(Operation::Remove),
            _ => None,
        }
    }

    /// 연산 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Lookup => "lookup",
            Operation::Add => "add",
            Operation::Remove => "remove",
        }
    }
}

/// 검증 전의 요청 envelope.
///
/// `{"operation": ..., "data": ...}`
#[derive(Debug, Deserialize)]
struct RequestEnvelope {
    #[serde(default)]
    operation: Option<Value>,
    #[serde(default)]
    data: Value,
}

/// 시리즈 추가 요청 데이터.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddSeriesRequest {
    /// 티커 심볼
    pub symbol: String,
    /// 회사명 (시리즈 고유 키)
    pub name: String,
}

/// 검증된 클라이언트 요청.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    /// 검색어
    Lookup(String),
    /// 추가할 종목
    Add(AddSeriesRequest),
    /// 제거할 회사명
    Remove(String),
}

impl ClientRequest {
    /// JSON 문자열에서 파싱 및 검증.
    ///
    /// # Errors
    ///
    /// - JSON 형식 오류: [`DispatchError::Parse`]
    /// - 알 수 없는 연산: [`DispatchError::InvalidOperation`]
    /// - 연산에 맞지 않는 `data`: [`DispatchError::InvalidData`]
    pub fn from_json(json: &str) -> Result<Self, DispatchError> {
        let envelope: RequestEnvelope = serde_json::from_str(json).map_err(DispatchError::Parse)?;

        let operation = match &envelope.operation {
            Some(Value::String(name)) => Operation::parse(name),
            _ => None,
        }
        .ok_or_else(|| DispatchError::InvalidOperation(describe_operation(&envelope.operation)))?;

        let invalid = |source| DispatchError::InvalidData {
            operation: operation.as_str(),
            source,
        };

        let request = match operation {
            Operation::Lookup => {
                ClientRequest::Lookup(serde_json::from_value(envelope.data).map_err(invalid)?)
            }
            Operation::Add => {
                ClientRequest::Add(serde_json::from_value(envelope.data).map_err(invalid)?)
            }
            Operation::Remove => {
                ClientRequest::Remove(serde_json::from_value(envelope.data).map_err(invalid)?)
            }
        };
        Ok(request)
    }

    /// 요청의 연산 종류.
    pub fn operation(&self) -> Operation {
        match self {
            ClientRequest::Lookup(_) => Operation::Lookup,
            ClientRequest::Add(_) => Operation::Add,
            ClientRequest::Remove(_) => Operation::Remove,
        }
    }
}

/// 에러 메시지에 넣을 연산 값 표현.
fn describe_operation(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => "null".to_string(),
    }
}

// ==================== 서버 → 클라이언트 메시지 ====================

/// 서버에서 클라이언트로 보내는 메시지.
///
/// `{"type": ..., "message": ...}` 형식이며, `type`은 이 열거형의 변형으로만
/// 만들어집니다. `add`와 `load`의 `message`는 시리즈 JSON을 다시 문자열로
/// 인코딩한 값입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "lowercase")]
pub enum ServerMessage {
    /// 요청 실패
    Error(String),
    /// 일반 안내 메시지
    Message(String),
    /// 검색 결과 (제공자 응답 원문)
    Lookup(String),
    /// 새로 추가된 시리즈
    #[serde(with = "json_text")]
    Add(SeriesRecord),
    /// 제거된 회사명
    Remove(String),
    /// 접속 시점의 전체 시리즈 목록
    #[serde(with = "json_text")]
    Load(Vec<SeriesRecord>),
}

impl ServerMessage {
    /// JSON 문자열로 직렬화.
    pub fn to_json(&self) -> Result<String, WsError> {
        serde_json::to_string(self).map_err(WsError::from)
    }

    /// JSON 문자열에서 파싱.
    pub fn from_json(json: &str) -> Result<Self, WsError> {
        serde_json::from_str(json).map_err(WsError::from)
    }

    /// 에러 메시지 생성 헬퍼.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error(message.into())
    }

    /// 메시지 타입 이름.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Error(_) => "error",
            ServerMessage::Message(_) => "message",
            ServerMessage::Lookup(_) => "lookup",
            ServerMessage::Add(_) => "add",
            ServerMessage::Remove(_) => "remove",
            ServerMessage::Load(_) => "load",
        }
    }
}

/// 값을 JSON 텍스트 문자열로 한 번 더 감싸서 (역)직렬화합니다.
mod json_text {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        let text = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: DeserializeOwned,
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        serde_json::from_str(&text).map_err(serde::de::Error::custom)
    }
}
