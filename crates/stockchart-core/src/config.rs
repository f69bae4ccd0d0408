//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//!
//! 로드 순서 (뒤가 앞을 덮어씀):
//! 1. 각 구조체의 `Default` 값
//! 2. 설정 파일 (`config/default.toml` 또는 `STOCKCHART_CONFIG` 경로, 없으면 건너뜀)
//! 3. `STOCKCHART_` 접두사 환경 변수 (예: `STOCKCHART_SERVER__PORT=8080`)
//! 4. `IP` / `PORT` 환경 변수 (호스팅 환경 호환)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::DEFAULT_PALETTE;
use crate::error::CoreError;
use crate::logging::LogFormat;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 외부 데이터 제공자 설정
    pub provider: ProviderConfig,
    /// 시리즈 표시 설정
    pub series: SeriesConfig,
    /// WebSocket 설정
    pub websocket: WebSocketConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// 외부 데이터 제공자(Markit On Demand) 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// 종목 검색 엔드포인트
    pub lookup_url: String,
    /// 차트 데이터 엔드포인트
    pub chart_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 차트 조회 기간 (일)
    pub lookback_days: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            lookup_url: "http://dev.markitondemand.com/Api/v2/Lookup/json".to_string(),
            chart_url: "http://dev.markitondemand.com/Api/v2/InteractiveChart/json".to_string(),
            timeout_secs: 15,
            lookback_days: 365 * 3,
        }
    }
}

/// 시리즈 표시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// 색상 팔레트 (순서대로 순환)
    pub palette: Vec<String>,
    /// 툴팁 소수점 자릿수
    pub value_decimals: u32,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            value_decimals: 2,
        }
    }
}

/// WebSocket 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// 클라이언트별 송신 큐 크기
    pub client_buffer: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self { client_buffer: 256 }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 에러가 아닙니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("STOCKCHART")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("series.palette")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("IP").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// `STOCKCHART_CONFIG` 또는 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var("STOCKCHART_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_toml(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// 설정 값의 유효성을 검사합니다.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.series.palette.is_empty() {
            return Err(CoreError::EmptyPalette);
        }
        if self.websocket.client_buffer == 0 {
            return Err(CoreError::InvalidConfig(
                "websocket.client_buffer must be greater than 0".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "provider.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.provider.lookback_days == 0 {
            return Err(CoreError::InvalidConfig(
                "provider.lookback_days must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
