//! 외부 시장 데이터 게이트웨이.
//!
//! 외부 제공자(Markit On Demand)에 대한 두 가지 비동기 호출을 담당합니다:
//! - 종목 검색 (`lookup`): 응답 본문을 검증 후 그대로 전달
//! - 차트 데이터 (`chart`): 3년 일별 종가를 받아 [`PendingSeries`]로 변환
//!
//! [`PendingSeries`]: stockchart_core::PendingSeries

pub mod error;
pub mod provider;

pub use error::{GatewayError, Result};
pub use provider::{
    markit::{parse_chart_body, validate_lookup_body, MarkitClient},
    ChartElementRequest, ChartRequest, SeriesProvider,
};
