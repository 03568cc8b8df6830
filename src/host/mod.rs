//! Boundary between the scheduler and the 3D application that owns the scene.
//!
//! Everything the pipeline does to the host goes through [`RenderHost`]: scene state reads and
//! writes, frame changes, the two render calls, undo snapshots, the interface lock and the timer
//! registration that drives the modal loop. The scene itself is plain data ([`scene::Scene`]) so
//! tasks can configure it directly; rendering stays opaque.

pub(crate) mod headless;
pub(crate) mod scene;

use std::time::Duration;

use crate::foundation::{core::FrameIndex, error::RenderqResult};
use scene::Scene;

/// Handle of a registered periodic timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(pub u64);

/// Host application services used by render tasks and the modal operator.
pub trait RenderHost {
    /// The active scene.
    fn scene(&self) -> &Scene;

    /// The active scene, for configuration by tasks.
    fn scene_mut(&mut self) -> &mut Scene;

    /// Make `frame` the current frame, re-evaluating animation.
    fn frame_set(&mut self, frame: FrameIndex) -> RenderqResult<()> {
        self.scene_mut().frame_current = frame;
        Ok(())
    }

    /// Render the current frame with the scene's render engine, writing the main image to
    /// `render.filepath` and running the compositor graph.
    fn render_still(&mut self) -> RenderqResult<()>;

    /// Render the current frame with the real-time viewport renderer to `render.filepath`.
    fn render_viewport(&mut self) -> RenderqResult<()>;

    /// Record an undo snapshot of the whole application state.
    fn undo_push(&mut self, message: &str) -> RenderqResult<()>;

    /// Revert to the most recent undo snapshot, consuming it.
    fn undo(&mut self) -> RenderqResult<()>;

    /// Block or release user interaction with the host while a job runs.
    fn set_lock_interface(&mut self, locked: bool);

    /// Register a timer that delivers a timer event every `interval`.
    fn event_timer_add(&mut self, interval: Duration) -> TimerHandle;

    /// Unregister a timer. Unknown handles are ignored.
    fn event_timer_remove(&mut self, timer: TimerHandle);
}
