//! 차트 동기화를 위한 도메인 모델.

mod color;
mod series;

pub use color::*;
pub use series::*;
