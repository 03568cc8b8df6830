use crate::foundation::error::{RenderqError, RenderqResult};

/// Scene frame number. Hosts allow negative frames, so this is signed.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub i64);

impl FrameIndex {
    /// The frame after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The frame before this one.
    pub fn prev(self) -> Self {
        Self(self.0 - 1)
    }
}

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive range of frames, as a scene's start and end frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// First frame.
    pub start: FrameIndex,
    /// Last frame.
    pub end: FrameIndex, // inclusive
}

impl FrameRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> RenderqResult<Self> {
        if start.0 > end.0 {
            return Err(RenderqError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames, both ends included.
    pub fn len_frames(self) -> u64 {
        (self.end.0 - self.start.0 + 1) as u64
    }
}

/// Row-major 4x4 homogeneous transform: rotation in the upper-left 3x3, translation in the last
/// column.
pub type RowMajor4 = [[f64; 4]; 4];

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
