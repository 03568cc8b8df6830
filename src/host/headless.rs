//! In-process [`RenderHost`] used by the CLI and tests.
//!
//! The headless host keeps the scene in memory and stands in for the render engine with a coarse
//! model: every pixel of a frame carries the same render-layer sample. Viewport renders only need
//! the flat colour; still renders also need the camera for the other passes. Depth is the active
//! camera's distance to the origin, motion vectors are the mean displacement of the animated
//! non-camera objects towards the previous and next frame. Compositor file outputs and the main
//! render are written with `image` when writing is enabled.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::compositor::graph::{RenderLayerSample, Rgba, output_file_path};
use crate::foundation::{
    core::FrameIndex,
    error::{RenderqError, RenderqResult},
};
use crate::host::{
    RenderHost, TimerHandle,
    scene::{ColorMode, FileFormat, ObjectKind, Scene},
};
use crate::operator::modal::{HostEvent, ModalStatus, RenderOperator};

/// Which render call produced a [`RenderRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderKind {
    /// [`RenderHost::render_still`].
    Still,
    /// [`RenderHost::render_viewport`].
    Viewport,
}

/// One render call as observed by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRecord {
    /// Render call that produced the record.
    pub kind: RenderKind,
    /// Current frame at the time of the call.
    pub frame: FrameIndex,
    /// Every file the call produced, main image first.
    pub files: Vec<PathBuf>,
}

/// Behaviour switches of [`HeadlessHost`].
#[derive(Clone, Debug, Default)]
pub struct HeadlessOpts {
    /// Write images to disk. When off, renders are only recorded.
    pub write_images: bool,
    /// Sleep for the timer interval between timer events in [`HeadlessHost::run_operator`].
    pub pace_timers: bool,
}

/// In-memory host: owns the scene, records renders and timers, optionally writes images.
pub struct HeadlessHost {
    scene: Scene,
    opts: HeadlessOpts,
    undo_stack: Vec<Scene>,
    lock_interface: bool,
    timers: BTreeMap<TimerHandle, Duration>,
    next_timer: u64,
    renders: Vec<RenderRecord>,
}

impl HeadlessHost {
    /// Host over `scene` with no timers, no undo history and an unlocked interface.
    pub fn new(scene: Scene, opts: HeadlessOpts) -> Self {
        Self {
            scene,
            opts,
            undo_stack: Vec::new(),
            lock_interface: false,
            timers: BTreeMap::new(),
            next_timer: 0,
            renders: Vec::new(),
        }
    }

    /// Every render call so far, in call order.
    pub fn renders(&self) -> &[RenderRecord] {
        &self.renders
    }

    /// Whether the interface is currently locked.
    pub fn is_interface_locked(&self) -> bool {
        self.lock_interface
    }

    /// Number of registered timers.
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of undo snapshots not yet reverted.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Consume the host, returning the scene in its final state.
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    /// Run the operator modally: `execute`, then deliver timer events until it reports a
    /// terminal status. `cancel_after` delivers a cancel event instead of the n-th timer tick.
    pub fn run_operator(
        &mut self,
        op: &mut RenderOperator,
        cancel_after: Option<u64>,
    ) -> RenderqResult<ModalStatus> {
        let mut status = op.execute(self)?;
        let mut tick = 0u64;
        while status == ModalStatus::RunningModal || status == ModalStatus::PassThrough {
            let Some(interval) = self.timers.values().next().copied() else {
                return Err(RenderqError::validation(
                    "modal operator is running without a timer",
                ));
            };
            if self.opts.pace_timers {
                std::thread::sleep(interval);
            }

            tick += 1;
            let event = match cancel_after {
                Some(n) if tick > n => HostEvent::Cancel,
                _ => HostEvent::Timer,
            };
            status = op.modal(self, event)?;
        }
        Ok(status)
    }

    /// Flat grey, transparent when the film is.
    fn base_color(&self) -> Rgba {
        let alpha = if self.scene.render.film_transparent {
            0.0
        } else {
            1.0
        };
        [0.8, 0.8, 0.8, alpha]
    }

    fn sample_layers(&self) -> RenderqResult<RenderLayerSample> {
        let frame = self.scene.frame_current;
        let camera = self.scene.active_camera()?;
        let [x, y, z] = camera.location_at(frame);
        let depth = (x * x + y * y + z * z).sqrt();

        let mut bwd = [0.0f64; 2];
        let mut fwd = [0.0f64; 2];
        let mut animated = 0usize;
        for obj in self.scene.objects.values() {
            if obj.action.is_none() || matches!(obj.kind, ObjectKind::Camera(_)) {
                continue;
            }
            let here = obj.location_at(frame);
            let prev = obj.location_at(frame.prev());
            let next = obj.location_at(frame.next());
            for axis in 0..2 {
                bwd[axis] += prev[axis] - here[axis];
                fwd[axis] += next[axis] - here[axis];
            }
            animated += 1;
        }
        if animated > 0 {
            let n = animated as f64;
            bwd = bwd.map(|v| v / n);
            fwd = fwd.map(|v| v / n);
        }

        Ok(RenderLayerSample {
            image: self.base_color(),
            depth: depth as f32,
            vector: [bwd[0] as f32, bwd[1] as f32, fwd[0] as f32, fwd[1] as f32],
        })
    }

    fn write_flat(&self, path: &Path, format: FileFormat, value: Rgba) -> RenderqResult<()> {
        if !self.opts.write_images {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (w, h) = (
            self.scene.render.resolution_x,
            self.scene.render.resolution_y,
        );
        let res = match format {
            FileFormat::OpenExr => image::Rgba32FImage::from_pixel(w, h, image::Rgba(value))
                .save_with_format(path, image::ImageFormat::OpenExr),
            FileFormat::Png => {
                let mut px = value.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
                if self.scene.render.color_mode != ColorMode::Rgba {
                    px[3] = 255;
                }
                image::RgbaImage::from_pixel(w, h, image::Rgba(px))
                    .save_with_format(path, image::ImageFormat::Png)
            }
        };
        res.map_err(|e| RenderqError::render(format!("write '{}': {e}", path.display())))
    }
}

impl RenderHost for HeadlessHost {
    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn render_still(&mut self) -> RenderqResult<()> {
        let frame = self.scene.frame_current;
        let sample = self.sample_layers()?;
        let mut files = Vec::new();

        let main_format = self.scene.render.file_format;
        let main = PathBuf::from(format!(
            "{}{:04}.{}",
            self.scene.render.filepath.display(),
            frame.0,
            main_format.extension()
        ));
        self.write_flat(&main, main_format, sample.image)?;
        files.push(main);

        if self.scene.render.use_compositing && self.scene.use_nodes {
            for out in self.scene.node_tree.evaluate(&sample)? {
                let path = output_file_path(&out.base_path, &out.slot_path, out.format, frame);
                self.write_flat(&path, out.format, out.value)?;
                files.push(path);
            }
        }

        tracing::debug!(frame = frame.0, files = files.len(), "render_still");
        self.renders.push(RenderRecord {
            kind: RenderKind::Still,
            frame,
            files,
        });
        Ok(())
    }

    fn render_viewport(&mut self) -> RenderqResult<()> {
        let frame = self.scene.frame_current;
        let path = self.scene.render.filepath.clone();
        self.write_flat(&path, self.scene.render.file_format, self.base_color())?;

        tracing::debug!(frame = frame.0, path = %path.display(), "render_viewport");
        self.renders.push(RenderRecord {
            kind: RenderKind::Viewport,
            frame,
            files: vec![path],
        });
        Ok(())
    }

    fn undo_push(&mut self, _message: &str) -> RenderqResult<()> {
        self.undo_stack.push(self.scene.clone());
        Ok(())
    }

    fn undo(&mut self) -> RenderqResult<()> {
        let snapshot = self
            .undo_stack
            .pop()
            .ok_or_else(|| RenderqError::undo("undo stack is empty"))?;
        self.scene = snapshot;
        Ok(())
    }

    fn set_lock_interface(&mut self, locked: bool) {
        self.lock_interface = locked;
    }

    fn event_timer_add(&mut self, interval: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(handle, interval);
        handle
    }

    fn event_timer_remove(&mut self, timer: TimerHandle) {
        self.timers.remove(&timer);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/headless.rs"]
mod tests;
