//! Markit On Demand 클라이언트.
//!
//! ## 엔드포인트
//! - `Lookup/json?input=<검색어>`: 종목 목록 (JSON 배열)
//! - `InteractiveChart/json?parameters=<JSON>`: 차트 이력
//!
//! ## 차트 응답 형식
//! ```json
//! {
//!   "Dates": ["2016-01-04T00:00:00", ...],
//!   "Elements": [
//!     { "Symbol": "AAPL", "DataSeries": { "close": { "values": [105.35, ...] } } }
//!   ]
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use stockchart_core::{DisplayHints, PendingSeries, ProviderConfig, SeriesPoint};
use tracing::{debug, instrument, warn};

use super::{ChartRequest, SeriesProvider};
use crate::error::{GatewayError, Result};

/// Markit On Demand API 클라이언트.
#[derive(Clone)]
pub struct MarkitClient {
    client: Client,
    lookup_url: String,
    chart_url: String,
    lookback_days: u32,
    display: DisplayHints,
}

impl MarkitClient {
    /// 제공자 설정으로 생성합니다.
    ///
    /// 모든 요청에 `timeout_secs` 타임아웃이 적용됩니다.
    pub fn new(config: &ProviderConfig, display: DisplayHints) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(GatewayError::Client)?;

        Ok(Self {
            client,
            lookup_url: config.lookup_url.clone(),
            chart_url: config.chart_url.clone(),
            lookback_days: config.lookback_days,
            display,
        })
    }

    /// 심볼에 대한 차트 요청 파라미터.
    pub fn chart_request(&self, symbol: &str) -> ChartRequest {
        ChartRequest::daily_close(symbol, self.lookback_days)
    }
}

#[async_trait]
impl SeriesProvider for MarkitClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.lookup_url)
            .query(&[("input", query)])
            .send()
            .await
            .map_err(GatewayError::LookupNotReceived)?;

        let body = response
            .text()
            .await
            .map_err(GatewayError::LookupNotReceived)?;

        debug!(bytes = body.len(), "Lookup response received");
        validate_lookup_body(body)
    }

    #[instrument(skip(self))]
    async fn fetch_series(&self, symbol: &str, label: &str) -> Result<PendingSeries> {
        let parameters = serde_json::to_string(&self.chart_request(symbol))?;

        let response = self
            .client
            .get(&self.chart_url)
            .query(&[("parameters", parameters.as_str())])
            .send()
            .await
            .map_err(GatewayError::ChartNotReceived)?;

        let body = response
            .text()
            .await
            .map_err(GatewayError::ChartNotReceived)?;

        let series = parse_chart_body(&body, label, self.display).inspect_err(|e| {
            if let GatewayError::UnexpectedChartBody { reason } = e {
                warn!(%symbol, %reason, "Malformed chart response");
            }
        })?;

        debug!(
            symbol = %series.symbol,
            points = series.points.len(),
            "Chart data received"
        );
        Ok(series)
    }
}

/// 검색 응답 본문을 검증합니다.
///
/// 본문이 `[`로 시작하지 않으면 오류 응답으로 간주합니다.
pub fn validate_lookup_body(body: String) -> Result<String> {
    if body.starts_with('[') {
        Ok(body)
    } else {
        Err(GatewayError::LookupFormat)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ChartResponse {
    #[serde(default)]
    dates: Option<Vec<String>>,
    elements: Vec<ChartElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ChartElement {
    symbol: String,
    data_series: DataSeries,
}

#[derive(Debug, Deserialize)]
struct DataSeries {
    close: CloseSeries,
}

#[derive(Debug, Deserialize)]
struct CloseSeries {
    values: Vec<Option<f64>>,
}

/// 차트 응답 본문을 시리즈로 변환합니다.
///
/// - JSON 오류, `Elements` 누락, 날짜 파싱 실패, 날짜/값 개수 불일치:
///   [`GatewayError::UnexpectedChartBody`]
/// - `Elements`가 비어 있음: [`GatewayError::NoData`]
///
/// 포인트는 타임스탬프 오름차순으로 정렬됩니다.
pub fn parse_chart_body(body: &str, label: &str, display: DisplayHints) -> Result<PendingSeries> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::unexpected(e.to_string()))?;

    let Some(element) = response.elements.into_iter().next() else {
        return Err(GatewayError::NoData);
    };

    let dates = response
        .dates
        .ok_or_else(|| GatewayError::unexpected("missing Dates"))?;
    let values = element.data_series.close.values;

    if dates.len() != values.len() {
        return Err(GatewayError::unexpected(format!(
            "{} dates but {} values",
            dates.len(),
            values.len()
        )));
    }

    let mut points = dates
        .iter()
        .zip(values)
        .map(|(date, value)| {
            parse_markit_date(date)
                .map(|ts| SeriesPoint::new(ts, value))
                .ok_or_else(|| GatewayError::unexpected(format!("invalid date: {}", date)))
        })
        .collect::<Result<Vec<_>>>()?;
    points.sort_by_key(SeriesPoint::timestamp);

    Ok(PendingSeries {
        symbol: element.symbol,
        label: label.to_string(),
        points,
        display,
    })
}

/// 날짜 문자열을 Unix epoch 밀리초로 변환합니다.
///
/// 오프셋이 없는 날짜/시각은 UTC로 해석합니다.
fn parse_markit_date(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = value.parse::<NaiveDateTime>() {
        return Some(dt.and_utc().timestamp_millis());
    }
    value
        .parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAN_4_2016_MS: i64 = 1_451_865_600_000;
    const JAN_5_2016_MS: i64 = 1_451_952_000_000;

    #[test]
    fn test_parse_markit_date_formats() {
        assert_eq!(parse_markit_date("2016-01-04T00:00:00"), Some(JAN_4_2016_MS));
        assert_eq!(parse_markit_date("2016-01-04T00:00:00Z"), Some(JAN_4_2016_MS));
        assert_eq!(parse_markit_date("2016-01-04"), Some(JAN_4_2016_MS));
        assert_eq!(parse_markit_date("yesterday"), None);
    }

    #[test]
    fn test_parse_chart_body() {
        let body = r#"{
            "Dates": ["2016-01-04T00:00:00", "2016-01-05T00:00:00"],
            "Elements": [
                {"Symbol": "AAPL", "DataSeries": {"close": {"values": [105.35, 102.71]}}}
            ]
        }"#;

        let series = parse_chart_body(body, "Apple Inc", DisplayHints::default()).unwrap();

        assert_eq!(series.symbol, "AAPL");
        assert_eq!(series.label, "Apple Inc");
        assert_eq!(
            series.points,
            vec![
                SeriesPoint::new(JAN_4_2016_MS, Some(105.35)),
                SeriesPoint::new(JAN_5_2016_MS, Some(102.71)),
            ]
        );
    }

    #[test]
    fn test_parse_chart_body_sorts_points() {
        let body = r#"{
            "Dates": ["2016-01-05T00:00:00", "2016-01-04T00:00:00"],
            "Elements": [
                {"Symbol": "AAPL", "DataSeries": {"close": {"values": [2.0, 1.0]}}}
            ]
        }"#;

        let series = parse_chart_body(body, "Apple Inc", DisplayHints::default()).unwrap();
        assert_eq!(series.points[0], SeriesPoint::new(JAN_4_2016_MS, Some(1.0)));
    }

    #[test]
    fn test_empty_elements_is_no_data() {
        let body = r#"{"Dates": [], "Elements": []}"#;
        assert!(matches!(
            parse_chart_body(body, "Nothing", DisplayHints::default()),
            Err(GatewayError::NoData)
        ));
    }

    #[test]
    fn test_malformed_bodies_are_unexpected() {
        let cases = [
            "<html>503</html>",
            r#"{"Message": "No symbol matches"}"#,
            r#"{"Elements": [{"Symbol": "AAPL", "DataSeries": {"close": {"values": [1.0]}}}]}"#,
            r#"{"Dates": ["2016-01-04"], "Elements": [{"Symbol": "AAPL"}]}"#,
            r#"{"Dates": ["not-a-date"], "Elements": [{"Symbol": "AAPL", "DataSeries": {"close": {"values": [1.0]}}}]}"#,
        ];

        for body in cases {
            assert!(
                matches!(
                    parse_chart_body(body, "Apple", DisplayHints::default()),
                    Err(GatewayError::UnexpectedChartBody { .. })
                ),
                "expected UnexpectedChartBody for {}",
                body
            );
        }
    }

    #[test]
    fn test_length_mismatch_is_unexpected() {
        let body = r#"{
            "Dates": ["2016-01-04T00:00:00", "2016-01-05T00:00:00"],
            "Elements": [{"Symbol": "AAPL", "DataSeries": {"close": {"values": [1.0]}}}]
        }"#;

        let err = parse_chart_body(body, "Apple", DisplayHints::default()).unwrap_err();
        match err {
            GatewayError::UnexpectedChartBody { reason } => {
                assert!(reason.contains("2 dates but 1 values"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_null_values_are_kept() {
        let body = r#"{
            "Dates": ["2016-01-04T00:00:00"],
            "Elements": [{"Symbol": "AAPL", "DataSeries": {"close": {"values": [null]}}}]
        }"#;

        let series = parse_chart_body(body, "Apple", DisplayHints::default()).unwrap();
        assert_eq!(series.points, vec![SeriesPoint::new(JAN_4_2016_MS, None)]);
    }

    #[test]
    fn test_validate_lookup_body() {
        assert!(validate_lookup_body("[]".to_string()).is_ok());
        assert!(matches!(
            validate_lookup_body("{\"Message\":\"err\"}".to_string()),
            Err(GatewayError::LookupFormat)
        ));
        assert!(matches!(
            validate_lookup_body(String::new()),
            Err(GatewayError::LookupFormat)
        ));
    }
}
