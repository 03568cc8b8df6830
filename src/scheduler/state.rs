use crate::foundation::core::FrameIndex;

/// Mutable run state shared between the scheduler and whichever task is current.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunState {
    /// Re-entrancy guard: set by the scheduler before a step, cleared by the task at the end of
    /// `render_next_frame`.
    pub rendering: bool,
    /// The current task has no work left (also true before the first task starts).
    pub task_finished: bool,
    /// Next frame to render for frame-based tasks.
    pub frame_cursor: FrameIndex,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            rendering: false,
            task_finished: true,
            frame_cursor: FrameIndex(0),
        }
    }
}
