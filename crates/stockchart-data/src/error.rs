//! 게이트웨이 오류 타입.
//!
//! 각 변형의 `Display` 문자열은 그대로 클라이언트 에러 메시지로 전달됩니다.

use thiserror::Error;

/// 외부 데이터 호출 오류.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 검색 요청 전송 실패 (연결, 타임아웃, 본문 수신)
    #[error("Lookup data not received")]
    LookupNotReceived(#[source] reqwest::Error),

    /// 검색 응답이 목록 형태가 아님
    #[error("Markit API lookup error")]
    LookupFormat,

    /// 차트 요청 전송 실패
    #[error("Chart data not received")]
    ChartNotReceived(#[source] reqwest::Error),

    /// 차트 응답 구조가 예상과 다름
    #[error("Unexpected body in Markit chart data call")]
    UnexpectedChartBody {
        /// 로그용 상세 사유
        reason: String,
    },

    /// 구조는 맞지만 해당 종목 데이터가 없음
    #[error("No data for that name")]
    NoData,

    /// 차트 요청 파라미터 직렬화 실패
    #[error("Chart request could not be encoded")]
    Encode(#[from] serde_json::Error),

    /// HTTP 클라이언트 생성 실패
    #[error("HTTP client could not be built")]
    Client(#[source] reqwest::Error),
}

impl GatewayError {
    /// 차트 응답 구조 오류 생성 헬퍼.
    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self::UnexpectedChartBody {
            reason: reason.into(),
        }
    }

    /// 메트릭 라벨용 오류 종류.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::LookupNotReceived(_) | GatewayError::ChartNotReceived(_) => "transport",
            GatewayError::LookupFormat | GatewayError::UnexpectedChartBody { .. } => "format",
            GatewayError::NoData => "no_data",
            GatewayError::Encode(_) | GatewayError::Client(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
