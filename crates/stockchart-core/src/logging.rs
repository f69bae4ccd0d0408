//! tracing 기반 로깅 초기화.
//!
//! 출력 형식은 `[logging] format`으로 고릅니다:
//! - **pretty**: 개발용 여러 줄 형식
//! - **json**: 로그 수집기용 한 줄 JSON
//! - **compact**: 한 줄 텍스트

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

/// 별도 지정이 없으면 한 단계 낮춰 출력하는 외부 크레이트.
const NOISY_TARGETS: [&str; 3] = ["hyper", "reqwest", "tungstenite"];

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 기본 필터 (예: "info", "stockchart_api=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
}

impl LogConfig {
    /// `[logging]` 설정 섹션에서 생성.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format,
        }
    }

    /// `EnvFilter`에 넘길 지시어.
    ///
    /// `level`에 이름이 없는 외부 HTTP/WebSocket 크레이트는 `warn`으로 고정합니다.
    pub fn filter_directives(&self) -> String {
        let mut directives = self.level.clone();
        for target in NOISY_TARGETS {
            if !self.level.contains(target) {
                directives.push_str(&format!(",{}=warn", target));
            }
        }
        directives
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        // span 종료 시 소요 시간 출력
        let layer = fmt::layer().with_span_events(FmtSpan::CLOSE);

        match self.format {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        }
    }
}

/// 전역 subscriber를 설치합니다.
///
/// `RUST_LOG`가 있으면 [`LogConfig::filter_directives`]보다 우선합니다.
/// 이미 설치된 subscriber가 있으면 에러를 반환합니다.
///
/// ```no_run
/// use stockchart_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig {
///     level: "debug".to_string(),
///     format: LogFormat::Json,
/// })
/// .unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter_directives()))?;

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(env_filter)
        .try_init()?;

    tracing::info!(format = ?config.format, level = %config.level, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Json,
        };
        let config = LogConfig::from_settings(&settings);

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_filter_directives_quiet_transport_crates() {
        let config = LogConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        };
        assert_eq!(
            config.filter_directives(),
            "info,hyper=warn,reqwest=warn,tungstenite=warn"
        );

        let config = LogConfig {
            level: "debug,reqwest=trace".to_string(),
            ..config
        };
        assert_eq!(
            config.filter_directives(),
            "debug,reqwest=trace,hyper=warn,tungstenite=warn"
        );
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        let format: LogFormat = serde_json::from_str(r#""compact""#).unwrap();
        assert_eq!(format, LogFormat::Compact);
        assert!(serde_json::from_str::<LogFormat>(r#""xml""#).is_err());
    }
}
