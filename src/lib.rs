//! renderq batch-renders image modalities of an animated sequence through a host 3D application.
//!
//! A job lists render tasks (viewport preview, depth, optical flow, scheduled optical flow). The
//! [`TaskScheduler`] runs them in order, one unit of work per host timer tick, so the host stays
//! responsive between frames. Everything the pipeline needs from the host goes through the
//! [`RenderHost`] trait; [`HeadlessHost`] implements it in-process for the CLI and tests.
//!
//! # Pipeline overview
//!
//! 1. **Load**: [`JobConfig`] from JSON, validated, scene prepared (camera rig applied)
//! 2. **Execute**: [`RenderOperator::execute`] locks the interface and registers the timer
//! 3. **Poll**: every timer event calls [`RenderOperator::modal`], which steps the scheduler
//! 4. **Tasks**: each [`RenderTask`] configures the scene/compositor, renders one unit per step,
//!    and restores the host on teardown
//!
//! The scheduled optical-flow task edits keyframes inside an [`UndoScope`], so every work item
//! leaves the animation exactly as it found it.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod animation;
mod camera;
mod compositor;
mod config;
mod foundation;
mod host;
mod operator;
mod scheduler;
mod tasks;
mod undo;

pub use animation::keyframes::{Action, FCurve, Keyframe, copy_keyframe, delete_keyframe};
pub use camera::rig::{
    CAMERA_NAME, CameraMotion, DEFAULT_FOV_DEG, DEFAULT_RESOLUTION, add_camera, set_camera,
    set_keyframes,
};
pub use compositor::config::{clear_compositor, output_depth, output_vector_field};
pub use compositor::graph::{
    CompositeOutput, Link, Node, NodeId, NodeKind, NodeTree, RenderLayerSample, Rgba,
    output_file_path,
};
pub use config::job::{JobConfig, JobPlan, TaskPlan};
pub use config::layout::OutputLayout;
pub use foundation::core::{FrameIndex, FrameRange, RowMajor4};
pub use foundation::error::{RenderqError, RenderqResult};
pub use host::headless::{HeadlessHost, HeadlessOpts, RenderKind, RenderRecord};
pub use host::scene::{
    CameraData, ColorMode, FileFormat, LensUnit, Object, ObjectKind, RenderSettings, Scene,
    ShadingType, ViewLayer,
};
pub use host::{RenderHost, TimerHandle};
pub use operator::modal::{HostEvent, ModalStatus, RenderOperator};
pub use scheduler::state::RunState;
pub use scheduler::task_scheduler::{SchedulerStatus, StepOutcome, TaskScheduler};
pub use tasks::depth::DepthTask;
pub use tasks::optical::OpticalFlowTask;
pub use tasks::scheduled::{
    Anchor, ScheduledOpticalFlowTask, WorkItem, interval_boundaries, plan_work_items,
};
pub use tasks::viewport::ViewportTask;
pub use tasks::{RenderTask, TaskContext, TaskKind};
pub use undo::scope::{UndoScope, undo_scope};
