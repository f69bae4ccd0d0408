//! 외부 데이터 제공자.
//!
//! [`SeriesProvider`] 트레이트가 검색/차트 호출의 경계이며,
//! 실제 구현은 [`markit::MarkitClient`]입니다.

pub mod markit;

use async_trait::async_trait;
use serde::Serialize;
use stockchart_core::PendingSeries;

use crate::error::Result;

/// 시리즈 데이터 제공자.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// 종목을 검색합니다.
    ///
    /// 성공 시 제공자의 응답 본문(JSON 배열 텍스트)을 그대로 반환합니다.
    async fn search(&self, query: &str) -> Result<String>;

    /// 종목의 종가 이력을 조회해 색상 할당 전의 시리즈를 만듭니다.
    async fn fetch_series(&self, symbol: &str, label: &str) -> Result<PendingSeries>;
}

/// 차트 데이터 요청 파라미터.
///
/// `parameters` 쿼리 값으로 JSON 직렬화되어 전송됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChartRequest {
    /// 정규화 여부 (항상 false)
    pub normalized: bool,
    /// 조회 기간 (일)
    pub number_of_days: u32,
    /// 데이터 주기
    pub data_period: String,
    /// 요청 요소 목록
    pub elements: Vec<ChartElementRequest>,
}

/// 차트 요청 요소.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChartElementRequest {
    /// 티커 심볼
    pub symbol: String,
    /// 요소 유형
    #[serde(rename = "Type")]
    pub kind: String,
    /// 요청 필드 (`c` = 종가)
    pub params: Vec<String>,
}

impl ChartRequest {
    /// 일별 종가 요청을 생성합니다.
    pub fn daily_close(symbol: impl Into<String>, number_of_days: u32) -> Self {
        Self {
            normalized: false,
            number_of_days,
            data_period: "Day".to_string(),
            elements: vec![ChartElementRequest {
                symbol: symbol.into(),
                kind: "price".to_string(),
                params: vec!["c".to_string()],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_request_wire_format() {
        let request = ChartRequest::daily_close("AAPL", 1095);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "Normalized": false,
                "NumberOfDays": 1095,
                "DataPeriod": "Day",
                "Elements": [
                    { "Symbol": "AAPL", "Type": "price", "Params": ["c"] }
                ]
            })
        );
    }
}
