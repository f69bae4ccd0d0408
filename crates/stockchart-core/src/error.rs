//! 핵심 에러 타입.

use thiserror::Error;

/// 도메인 및 설정 검증 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 색상 팔레트가 비어 있음
    #[error("색상 팔레트가 비어 있습니다")]
    EmptyPalette,

    /// 잘못된 설정 값
    #[error("설정 에러: {0}")]
    InvalidConfig(String),
}
