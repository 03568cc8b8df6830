//! Optical flow re-sampled between interval boundaries.
//!
//! The frame range is cut into intervals of `interval_length` frames. For every frame `j`
//! strictly inside an interval `(left, right)` the task renders flow as if `j` sat right next to
//! a boundary: it temporarily moves the keys of `j` onto the frame adjacent to the boundary,
//! renders backward and forward flow across that pair of frames, then reverts the edit.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::animation::keyframes::{copy_keyframe, delete_keyframe};
use crate::compositor::config::{clear_compositor, output_vector_field};
use crate::config::layout::OutputLayout;
use crate::foundation::{
    core::{FrameIndex, FrameRange},
    error::{RenderqError, RenderqResult},
};
use crate::host::RenderHost;
use crate::scheduler::state::RunState;
use crate::tasks::{RenderTask, TaskContext, TaskKind};
use crate::undo::scope::undo_scope;

/// Which boundary of the interval a work item is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "role", content = "frame", rename_all = "snake_case")]
pub enum Anchor {
    /// Left boundary; the sample moves to the frame after it.
    Left(FrameIndex),
    /// Right boundary; the sample moves to the frame before it.
    Right(FrameIndex),
}

/// One intermediate frame to re-sample against one boundary.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkItem {
    /// `{base}/{left}_{right}` of the interval.
    pub output_dir: PathBuf,
    /// Boundary the sample is moved next to.
    pub anchor: Anchor,
    /// Intermediate frame whose keys are re-sampled.
    pub sample: FrameIndex,
}

impl WorkItem {
    /// Frame next to the boundary that receives the sample's keys.
    pub fn target_frame(&self) -> FrameIndex {
        match self.anchor {
            Anchor::Left(left) => left.next(),
            Anchor::Right(right) => right.prev(),
        }
    }

    /// Frames rendered for the backward and the forward flow image, in that order.
    pub fn render_frames(&self) -> (FrameIndex, FrameIndex) {
        match self.anchor {
            Anchor::Left(left) => (left.next(), left),
            Anchor::Right(right) => (right, right.prev()),
        }
    }

    /// Filename tag distinguishing the outputs of different samples in one interval.
    pub fn tag(&self) -> String {
        format!("{}_", self.sample.0)
    }
}

/// `[start, start+L-1, start+2L-1, ...]`, every value within the range. Frames after the last
/// boundary are not covered by any interval.
pub fn interval_boundaries(
    range: FrameRange,
    interval_length: u32,
) -> RenderqResult<Vec<FrameIndex>> {
    if interval_length == 0 {
        return Err(RenderqError::validation("interval_length must be > 0"));
    }

    let step = i64::from(interval_length);
    let mut out = vec![range.start];
    let mut f = range.start.0 + step - 1;
    while f <= range.end.0 {
        out.push(FrameIndex(f));
        f += step;
    }
    Ok(out)
}

/// Every work item of a run, in execution order: per interval, per intermediate frame, the
/// left-anchored item then the right-anchored one.
pub fn plan_work_items(
    range: FrameRange,
    interval_length: u32,
    layout: &OutputLayout,
) -> RenderqResult<VecDeque<WorkItem>> {
    let boundaries = interval_boundaries(range, interval_length)?;
    let mut items = VecDeque::new();
    for pair in boundaries.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        let output_dir = layout.interval_dir(left, right);
        for j in (left.0 + 1)..right.0 {
            for anchor in [Anchor::Left(left), Anchor::Right(right)] {
                items.push_back(WorkItem {
                    output_dir: output_dir.clone(),
                    anchor,
                    sample: FrameIndex(j),
                });
            }
        }
    }
    Ok(items)
}

/// Optical flow of every intermediate frame against both boundaries of its interval, one
/// [`WorkItem`] per step.
#[derive(Debug)]
pub struct ScheduledOpticalFlowTask {
    interval_length: u32,
    queue: VecDeque<WorkItem>,
}

impl ScheduledOpticalFlowTask {
    /// Task with an empty queue; the queue is planned in `set_rendering`.
    pub fn new(interval_length: u32) -> Self {
        Self {
            interval_length,
            queue: VecDeque::new(),
        }
    }

    /// Work items left.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn process(
        host: &mut dyn RenderHost,
        item: &WorkItem,
        ctx: &TaskContext,
    ) -> RenderqResult<()> {
        let target = item.target_frame();
        let (bwd_frame, fwd_frame) = item.render_frames();
        let tag = item.tag();

        undo_scope(host, "scheduled optical flow", |h| {
            if item.sample != target {
                let action = h
                    .scene_mut()
                    .object_mut(&ctx.animated_object)?
                    .action_mut()?;
                delete_keyframe(action, target);
                copy_keyframe(action, item.sample, target)?;
            }

            output_vector_field(h.scene_mut(), false, true, &item.output_dir, &tag)?;
            h.frame_set(bwd_frame)?;
            h.render_still()?;

            output_vector_field(h.scene_mut(), true, false, &item.output_dir, &tag)?;
            h.frame_set(fwd_frame)?;
            h.render_still()
        })
    }
}

impl RenderTask for ScheduledOpticalFlowTask {
    fn kind(&self) -> TaskKind {
        TaskKind::ScheduledOpticalFlow {
            interval_length: self.interval_length,
        }
    }

    fn set_rendering(
        &mut self,
        host: &mut dyn RenderHost,
        state: &mut RunState,
        ctx: &TaskContext,
    ) -> RenderqResult<()> {
        state.task_finished = false;
        let scene = host.scene_mut();
        if scene.object(&ctx.animated_object)?.action.is_none() {
            return Err(RenderqError::keyframe(format!(
                "object '{}' has no animation data",
                ctx.animated_object
            )));
        }

        scene.render.filepath = ctx.layout.tmp_path();
        self.queue = plan_work_items(scene.frame_range()?, self.interval_length, &ctx.layout)?;
        tracing::info!(items = self.queue.len(), "scheduled optical flow planned");
        Ok(())
    }

    fn render_next_frame(
        &mut self,
        host: &mut dyn RenderHost,
        state: &mut RunState,
        ctx: &TaskContext,
    ) -> RenderqResult<()> {
        let result = match self.queue.pop_front() {
            None => {
                state.task_finished = true;
                Ok(())
            }
            Some(item) => {
                host.scene_mut().render.filepath = ctx.layout.tmp_path();
                tracing::debug!(sample = item.sample.0, anchor = ?item.anchor, "work item");
                Self::process(host, &item, ctx).map(|()| {
                    if self.queue.is_empty() {
                        state.task_finished = true;
                    }
                })
            }
        };
        state.rendering = false;
        result
    }

    fn clear_rendering(&mut self, host: &mut dyn RenderHost) -> RenderqResult<()> {
        self.queue.clear();
        clear_compositor(host.scene_mut());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tasks/scheduled.rs"]
mod tests;
