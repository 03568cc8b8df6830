//! Render tasks: one modality each, with a setup / step / teardown lifecycle driven by the
//! scheduler.

pub(crate) mod depth;
pub(crate) mod optical;
pub(crate) mod scheduled;
pub(crate) mod viewport;

use crate::config::layout::OutputLayout;
use crate::foundation::{core::FrameIndex, error::RenderqResult};
use crate::host::RenderHost;
use crate::scheduler::state::RunState;

pub(crate) const DEFAULT_INTERVAL_LENGTH: u32 = 8;

fn default_interval_length() -> u32 {
    DEFAULT_INTERVAL_LENGTH
}

/// Which modality a task renders. This is the serialized form of a task in a job file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    /// [`viewport::ViewportTask`].
    Viewport,
    /// [`depth::DepthTask`].
    Depth,
    /// [`optical::OpticalFlowTask`].
    OpticalFlow,
    /// [`scheduled::ScheduledOpticalFlowTask`].
    ScheduledOpticalFlow {
        /// Frames per interval, boundaries included. Defaults to 8.
        #[serde(default = "default_interval_length")]
        interval_length: u32,
    },
}

impl TaskKind {
    /// Short name used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Viewport => "viewport",
            Self::Depth => "depth",
            Self::OpticalFlow => "optical_flow",
            Self::ScheduledOpticalFlow { .. } => "scheduled_optical_flow",
        }
    }

    /// A fresh task of this kind.
    pub fn build(self) -> Box<dyn RenderTask> {
        match self {
            Self::Viewport => Box::new(viewport::ViewportTask::default()),
            Self::Depth => Box::new(depth::DepthTask),
            Self::OpticalFlow => Box::new(optical::OpticalFlowTask),
            Self::ScheduledOpticalFlow { interval_length } => {
                Box::new(scheduled::ScheduledOpticalFlowTask::new(interval_length))
            }
        }
    }
}

/// Job-wide inputs every task may read.
#[derive(Clone, Debug)]
pub struct TaskContext {
    /// Output directories.
    pub layout: OutputLayout,
    /// Added to the camera's far clip to get the depth normalisation distance.
    pub depth_margin: f64,
    /// Object whose keyframes the scheduled optical-flow task re-samples.
    pub animated_object: String,
}

/// One render modality with a setup / step / teardown lifecycle.
pub trait RenderTask {
    /// The serialized form of this task.
    fn kind(&self) -> TaskKind;

    /// Configure the host for this modality and mark the task unfinished.
    fn set_rendering(
        &mut self,
        host: &mut dyn RenderHost,
        state: &mut RunState,
        ctx: &TaskContext,
    ) -> RenderqResult<()>;

    /// Perform one unit of work. Sets `state.task_finished` after the last unit and always
    /// clears `state.rendering` before returning.
    fn render_next_frame(
        &mut self,
        host: &mut dyn RenderHost,
        state: &mut RunState,
        ctx: &TaskContext,
    ) -> RenderqResult<()>;

    /// Undo what `set_rendering` changed. Calling it again is a no-op.
    fn clear_rendering(&mut self, host: &mut dyn RenderHost) -> RenderqResult<()>;
}

/// Shared frame-by-frame step: render the cursor frame, advance, flag completion at
/// `frame_end`.
pub(crate) fn step_frame<F>(
    host: &mut dyn RenderHost,
    state: &mut RunState,
    render: F,
) -> RenderqResult<()>
where
    F: FnOnce(&mut dyn RenderHost, FrameIndex) -> RenderqResult<()>,
{
    let end = host.scene().frame_end;
    let result = if state.frame_cursor <= end {
        let frame = state.frame_cursor;
        host.frame_set(frame)
            .and_then(|()| render(&mut *host, frame))
            .map(|()| {
                if frame == end {
                    state.task_finished = true;
                }
                state.frame_cursor = frame.next();
            })
    } else {
        state.task_finished = true;
        Ok(())
    };
    state.rendering = false;
    result
}

#[cfg(test)]
#[path = "../../tests/unit/tasks/mod.rs"]
mod tests;
