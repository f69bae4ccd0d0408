//! 서버 에러 타입.
//!
//! [`DispatchError`]의 `Display` 문자열은 `error` 메시지로 요청한 클라이언트에게만
//! 전달됩니다. 어떤 에러도 브로드캐스트되거나 연결을 끊지 않습니다.

use stockchart_core::CoreError;
use stockchart_data::GatewayError;
use thiserror::Error;

use crate::services::registry::RegistryError;

/// 요청 처리 에러.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// 요청 본문이 JSON 객체가 아님
    #[error("Could not parse data")]
    Parse(#[source] serde_json::Error),

    /// `operation`이 없거나 지원하지 않는 값
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// `data`가 연산이 요구하는 형태가 아님
    #[error("Invalid data for operation: {operation}")]
    InvalidData {
        /// 연산 이름
        operation: &'static str,
        /// 역직렬화 에러
        #[source]
        source: serde_json::Error,
    },

    /// 레지스트리 충돌 (중복 추가)
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// 제거할 시리즈가 없음
    #[error("Series to remove was not found")]
    NotFound,

    /// 외부 데이터 호출 실패
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl DispatchError {
    /// 메트릭 라벨용 에러 종류.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Parse(_) => "parse",
            DispatchError::InvalidOperation(_) => "invalid_operation",
            DispatchError::InvalidData { .. } => "invalid_data",
            DispatchError::Registry(_) => "duplicate",
            DispatchError::NotFound => "not_found",
            DispatchError::Gateway(e) => e.kind(),
        }
    }
}

/// 서버 시작 에러.
#[derive(Debug, Error)]
pub enum StartupError {
    /// 설정 검증 실패
    #[error("설정 에러: {0}")]
    Config(#[from] CoreError),

    /// 데이터 제공자 초기화 실패
    #[error("데이터 제공자 초기화 실패: {0}")]
    Provider(#[from] GatewayError),
}
