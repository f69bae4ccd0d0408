//! # Stockchart Core
//!
//! 주식 차트 동기화 서버의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서버 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시리즈 레코드 및 차트 포인트
//! - 색상 팔레트 순환 할당기
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
