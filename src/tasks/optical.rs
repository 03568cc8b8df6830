use crate::compositor::config::{clear_compositor, output_vector_field};
use crate::foundation::error::RenderqResult;
use crate::host::RenderHost;
use crate::scheduler::state::RunState;
use crate::tasks::{RenderTask, TaskContext, TaskKind, step_frame};

/// Forward and backward flow per frame, `{base}/optical/all/{fwd,bwd}_flow_####.exr`.
#[derive(Debug, Default)]
pub struct OpticalFlowTask;

impl RenderTask for OpticalFlowTask {
    fn kind(&self) -> TaskKind {
        TaskKind::OpticalFlow
    }

    fn set_rendering(
        &mut self,
        host: &mut dyn RenderHost,
        state: &mut RunState,
        ctx: &TaskContext,
    ) -> RenderqResult<()> {
        state.task_finished = false;
        let scene = host.scene_mut();
        scene.render.filepath = ctx.layout.tmp_path();
        output_vector_field(scene, true, true, &ctx.layout.optical_all_dir(), "")
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
#[path = "../../tests/unit/tasks/optical.rs"]
mod tests;
