use crate::compositor::config::{clear_compositor, output_depth};
use crate::foundation::error::{RenderqError, RenderqResult};
use crate::host::RenderHost;
use crate::scheduler::state::RunState;
use crate::tasks::{RenderTask, TaskContext, TaskKind, step_frame};

/// Normalised inverted depth per frame, `{base}/depth/depth_####.exr`.
#[derive(Debug, Default)]
pub struct DepthTask;

impl RenderTask for DepthTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Depth
    }

    fn set_rendering(
        &mut self,
        host: &mut dyn RenderHost,
        state: &mut RunState,
        ctx: &TaskContext,
    ) -> RenderqResult<()> {
        state.task_finished = false;
        let scene = host.scene_mut();
        let camera = scene.active_camera()?;
        let clip_end = camera
            .camera()
            .map(|c| c.clip_end)
            .ok_or_else(|| RenderqError::missing_object("active camera has no camera data"))?;
        let max_distance = clip_end + ctx.depth_margin;

        scene.render.filepath = ctx.layout.tmp_path();
        output_depth(scene, max_distance as f32, &ctx.layout.depth_dir())?;
        tracing::debug!(max_distance, "depth compositor configured");
        Ok(())
    }

    fn render_next_frame(
        &mut self,
        host: &mut dyn RenderHost,
        state: &mut RunState,
        _ctx: &TaskContext,
    ) -> RenderqResult<()> {
        step_frame(host, state, |host, _| host.render_still())
    }

    fn clear_rendering(&mut self, host: &mut dyn RenderHost) -> RenderqResult<()> {
        clear_compositor(host.scene_mut());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tasks/depth.rs"]
mod tests;
