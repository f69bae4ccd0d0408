//! 차트 시리즈 타입.
//!
//! 이 모듈은 레지스트리와 클라이언트 사이에서 교환되는 시리즈 타입을 정의합니다:
//! - `SeriesPoint` - `[timestamp_ms, close]` 차트 포인트
//! - `DisplayHints` - 툴팁 표시 옵션 (해석하지 않고 그대로 전달)
//! - `PendingSeries` - 색상 할당 전의 시리즈
//! - `SeriesRecord` - 레지스트리에 저장되는 완성된 시리즈
//!
//! 직렬화 필드명은 클라이언트 차트 라이브러리의 시리즈 형식
//! (`name`, `company`, `data`, `tooltip`, `color`)을 따릅니다.

use serde::{Deserialize, Serialize};

/// 차트 포인트.
///
/// JSON에서는 `[timestamp_ms, value]` 2원소 배열로 표현됩니다.
/// 값이 없는 날짜는 `null`로 유지됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint(pub i64, pub Option<f64>);

impl SeriesPoint {
    /// 새 포인트를 생성합니다.
    pub fn new(timestamp_ms: i64, value: Option<f64>) -> Self {
        Self(timestamp_ms, value)
    }

    /// Unix epoch 밀리초 타임스탬프.
    pub fn timestamp(&self) -> i64 {
        self.0
    }
}

/// 표시 옵션.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayHints {
    /// 툴팁 소수점 자릿수
    #[serde(rename = "valueDecimals")]
    pub value_decimals: u32,
}

impl DisplayHints {
    /// 소수점 자릿수를 지정해 생성합니다.
    pub fn with_decimals(value_decimals: u32) -> Self {
        Self { value_decimals }
    }
}

impl Default for DisplayHints {
    fn default() -> Self {
        Self::with_decimals(2)
    }
}

/// 색상 할당 전의 시리즈.
///
/// 외부 데이터 조회가 끝난 뒤 레지스트리에 넘겨지며,
/// 색상은 레지스트리가 추가 시점에 할당합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSeries {
    /// 티커 심볼
    pub symbol: String,
    /// 회사명 (고유 키)
    pub label: String,
    /// 오름차순 차트 포인트
    pub points: Vec<SeriesPoint>,
    /// 표시 옵션
    pub display: DisplayHints,
}

impl PendingSeries {
    /// 색상을 붙여 완성된 레코드를 만듭니다.
    pub fn with_color(self, color: impl Into<String>) -> SeriesRecord {
        SeriesRecord {
            symbol: self.symbol,
            label: self.label,
            points: self.points,
            display: self.display,
            color: color.into(),
        }
    }
}

/// 레지스트리에 저장되는 시리즈 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    /// 티커 심볼 (정보용, 키가 아님)
    #[serde(rename = "name")]
    pub symbol: String,
    /// 회사명. 레지스트리 내 고유 키입니다.
    #[serde(rename = "company")]
    pub label: String,
    /// 오름차순 차트 포인트
    #[serde(rename = "data")]
    pub points: Vec<SeriesPoint>,
    /// 표시 옵션
    #[serde(rename = "tooltip")]
    pub display: DisplayHints,
    /// 팔레트에서 할당된 색상
    pub color: String,
}
