//! 시리즈 색상 순환 할당기.

use crate::error::CoreError;

/// 기본 색상 팔레트.
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#4292f4", "#f788ee", "#5bffad", "#ff4444", "#ffaf26", "#1f1533",
];

/// 고정 팔레트를 순환하며 색상을 할당합니다.
///
/// 커서는 "전진 후 읽기" 방식입니다. 첫 호출은 팔레트의 0번 색상을 반환하고,
/// 팔레트 끝에 도달하면 0으로 돌아갑니다. 시리즈가 제거되어도 커서는
/// 되돌아가지 않습니다.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    palette: Vec<String>,
    cursor: Option<usize>,
}

impl ColorCycle {
    /// 팔레트로 생성합니다.
    ///
    /// # Errors
    /// 팔레트가 비어 있으면 `CoreError::EmptyPalette`를 반환합니다.
    pub fn new(palette: Vec<String>) -> Result<Self, CoreError> {
        if palette.is_empty() {
            return Err(CoreError::EmptyPalette);
        }
        Ok(Self {
            palette,
            cursor: None,
        })
    }

    /// 커서를 한 칸 전진시키고 새 위치의 색상을 반환합니다.
    pub fn next_color(&mut self) -> &str {
        let index = match self.cursor {
            Some(i) if i + 1 < self.palette.len() => i + 1,
            _ => 0,
        };
        self.cursor = Some(index);
        &self.palette[index]
    }
}

impl Default for ColorCycle {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            cursor: None,
        }
    }
}
