use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::rig::{CameraMotion, add_camera, set_keyframes};
use crate::config::layout::OutputLayout;
use crate::foundation::error::{RenderqError, RenderqResult};
use crate::host::scene::Scene;
use crate::operator::modal::RenderOperator;
use crate::scheduler::task_scheduler::TaskScheduler;
use crate::tasks::{
    TaskContext, TaskKind,
    scheduled::{WorkItem, plan_work_items},
};

fn default_output_dir() -> PathBuf {
    PathBuf::from("new_folder1")
}

fn default_tasks() -> Vec<TaskKind> {
    vec![TaskKind::Viewport, TaskKind::Depth]
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_depth_margin() -> f64 {
    5.0
}

fn default_animated_object() -> String {
    "Armature".to_string()
}

/// A render job: the scene to render, what to render and where to put it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct JobConfig {
    /// Base directory of every output. Defaults to `new_folder1`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Tasks in execution order.
    #[serde(default = "default_tasks")]
    pub tasks: Vec<TaskKind>,
    /// Timer interval of the modal operator. Defaults to 500.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Added to the camera's far clip for depth normalisation. Defaults to 5.
    #[serde(default = "default_depth_margin")]
    pub depth_margin: f64,
    /// Object re-sampled by scheduled optical flow. Defaults to `Armature`.
    #[serde(default = "default_animated_object")]
    pub animated_object: String,
    /// Scene to render.
    #[serde(default)]
    pub scene: Scene,
    /// Optional two-pose camera animation applied before rendering.
    #[serde(default)]
    pub camera: Option<CameraMotion>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            tasks: default_tasks(),
            poll_interval_ms: default_poll_interval_ms(),
            depth_margin: default_depth_margin(),
            animated_object: default_animated_object(),
            scene: Scene::default(),
            camera: None,
        }
    }
}

/// Per-task amount of work, as `renderq plan` prints it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TaskPlan {
    /// The planned task.
    pub task: TaskKind,
    /// Scheduler steps that perform render work for this task.
    pub steps: u64,
    /// Work items of a scheduled optical-flow task, in execution order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_items: Option<Vec<WorkItem>>,
}

/// Dry run of a whole job.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct JobPlan {
    /// One entry per task, in execution order.
    pub tasks: Vec<TaskPlan>,
    /// Every scheduler step until the run reports finished, including the final one.
    pub total_steps: u64,
}

impl JobConfig {
    /// Parse a job from JSON, filling unset fields with defaults.
    pub fn from_json_str(s: &str) -> RenderqResult<Self> {
        serde_json::from_str(s).map_err(|e| RenderqError::serde(e.to_string()))
    }

    /// Read and parse a job file.
    pub fn load(path: &Path) -> RenderqResult<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Reject empty task lists, zero intervals, bad margins and invalid scenes.
    pub fn validate(&self) -> RenderqResult<()> {
        if self.tasks.is_empty() {
            return Err(RenderqError::validation("job must list at least one task"));
        }
        if self.poll_interval_ms == 0 {
            return Err(RenderqError::validation("poll_interval_ms must be > 0"));
        }
        if !self.depth_margin.is_finite() || self.depth_margin < 0.0 {
            return Err(RenderqError::validation(
                "depth_margin must be a finite, non-negative distance",
            ));
        }
        for task in &self.tasks {
            if let TaskKind::ScheduledOpticalFlow { interval_length: 0 } = task {
                return Err(RenderqError::validation("interval_length must be > 0"));
            }
        }
        self.scene.validate()
    }

    /// Output layout rooted at `output_dir`.
    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.output_dir)
    }

    /// `poll_interval_ms` as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Inputs shared by every task of the job.
    pub fn task_context(&self) -> TaskContext {
        TaskContext {
            layout: self.layout(),
            depth_margin: self.depth_margin,
            animated_object: self.animated_object.clone(),
        }
    }

    /// The scene ready to render: camera rigged when a camera motion is configured, current
    /// frame at the range start.
    pub fn prepare_scene(&self) -> RenderqResult<Scene> {
        let mut scene = self.scene.clone();
        if let Some(motion) = &self.camera {
            add_camera(&mut scene)?;
            set_keyframes(&mut scene, motion)?;
        }
        scene.frame_current = scene.frame_start;
        scene.validate()?;
        Ok(scene)
    }

    /// Modal operator running the job's tasks in order.
    pub fn build_operator(&self) -> RenderOperator {
        let scheduler = TaskScheduler::new(self.tasks.iter().copied(), self.task_context());
        RenderOperator::new(scheduler, self.poll_interval())
    }

    /// Step counts and work items of a run, without touching a host.
    pub fn plan(&self) -> RenderqResult<JobPlan> {
        let range = self.scene.frame_range()?;
        let layout = self.layout();
        let mut tasks = Vec::with_capacity(self.tasks.len());
        for &task in &self.tasks {
            let plan = match task {
                TaskKind::ScheduledOpticalFlow { interval_length } => {
                    let items: Vec<WorkItem> =
                        plan_work_items(range, interval_length, &layout)?.into();
                    TaskPlan {
                        task,
                        // An empty work queue still takes one step to notice it is done.
                        steps: (items.len() as u64).max(1),
                        work_items: Some(items),
                    }
                }
                TaskKind::Viewport | TaskKind::Depth | TaskKind::OpticalFlow => TaskPlan {
                    task,
                    steps: range.len_frames(),
                    work_items: None,
                },
            };
            tasks.push(plan);
        }
        let total_steps = tasks.iter().map(|t| t.steps).sum::<u64>() + 1;
        Ok(JobPlan { tasks, total_steps })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/job.rs"]
mod tests;
