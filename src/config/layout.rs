use std::path::PathBuf;

use crate::foundation::core::FrameIndex;

/// Where every task writes its images, relative to one base directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    base: PathBuf,
}

impl OutputLayout {
    /// Layout under `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Viewport frames.
    pub fn ani_dir(&self) -> PathBuf {
        self.base.join("ani")
    }

    /// Depth images.
    pub fn depth_dir(&self) -> PathBuf {
        self.base.join("depth")
    }

    /// Root of the optical-flow outputs.
    pub fn optical_dir(&self) -> PathBuf {
        self.base.join("optical")
    }

    /// Per-frame optical flow.
    pub fn optical_all_dir(&self) -> PathBuf {
        self.optical_dir().join("all")
    }

    /// Main render output prefix for compositor-driven tasks.
    pub fn tmp_path(&self) -> PathBuf {
        self.base.join("tmp")
    }

    /// `{base}/ani/{frame:04}.png`
    pub fn viewport_frame_path(&self, frame: FrameIndex) -> PathBuf {
        self.ani_dir().join(format!("{:04}.png", frame.0))
    }

    /// Scheduled optical flow of one interval: `{base}/{left}_{right}`.
    pub fn interval_dir(&self, left: FrameIndex, right: FrameIndex) -> PathBuf {
        self.base.join(format!("{}_{}", left.0, right.0))
    }
}
