use std::path::PathBuf;

use crate::foundation::error::RenderqResult;
use crate::host::{
    RenderHost,
    scene::{ColorMode, FileFormat, ShadingType},
};
use crate::scheduler::state::RunState;
use crate::tasks::{RenderTask, TaskContext, TaskKind, step_frame};

/// Host settings overwritten by [`ViewportTask::set_rendering`].
#[derive(Clone, Debug)]
struct SavedViewport {
    shading: ShadingType,
    film_transparent: bool,
    file_format: FileFormat,
    color_mode: ColorMode,
    filepath: PathBuf,
    hidden: Vec<(String, bool)>,
}

/// Material-preview frames from the real-time viewport renderer, transparent background, only
/// meshes visible. Writes `{base}/ani/{frame:04}.png`.
#[derive(Debug, Default)]
pub struct ViewportTask {
    saved: Option<SavedViewport>,
}

impl RenderTask for ViewportTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Viewport
    }

    fn set_rendering(
        &mut self,
        host: &mut dyn RenderHost,
        state: &mut RunState,
        ctx: &TaskContext,
    ) -> RenderqResult<()> {
        state.task_finished = false;
        let scene = host.scene_mut();
        let non_mesh = scene.non_mesh_objects();

        if self.saved.is_none() {
            self.saved = Some(SavedViewport {
                shading: scene.viewport_shading,
                film_transparent: scene.render.film_transparent,
                file_format: scene.render.file_format,
                color_mode: scene.render.color_mode,
                filepath: scene.render.filepath.clone(),
                hidden: non_mesh
                    .iter()
                    .filter_map(|name| scene.objects.get(name))
                    .map(|o| (o.name.clone(), o.hide_viewport))
                    .collect(),
            });
        }

        scene.viewport_shading = ShadingType::Material;
        scene.render.film_transparent = true;
        scene.render.file_format = FileFormat::Png;
        scene.render.color_mode = ColorMode::Rgba;
        scene.render.filepath = ctx.layout.ani_dir();
        for name in &non_mesh {
            scene.object_mut(name)?.hide_viewport = true;
        }
        Ok(())
    }

    fn render_next_frame(
        &mut self,
        host: &mut dyn RenderHost,
        state: &mut RunState,
        ctx: &TaskContext,
    ) -> RenderqResult<()> {
        step_frame(host, state, |host, frame| {
            host.scene_mut().render.filepath = ctx.layout.viewport_frame_path(frame);
            host.render_viewport()
        })
    }

    fn clear_rendering(&mut self, host: &mut dyn RenderHost) -> RenderqResult<()> {
        let Some(saved) = self.saved.take() else {
            return Ok(());
        };

        let scene = host.scene_mut();
        scene.viewport_shading = saved.shading;
        scene.render.film_transparent = saved.film_transparent;
        scene.render.file_format = saved.file_format;
        scene.render.color_mode = saved.color_mode;
        scene.render.filepath = saved.filepath;
        for (name, hidden) in saved.hidden {
            if let Some(obj) = scene.objects.get_mut(&name) {
                obj.hide_viewport = hidden;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tasks/viewport.rs"]
mod tests;
