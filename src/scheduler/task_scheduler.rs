use std::collections::VecDeque;

use crate::foundation::error::{RenderqError, RenderqResult};
use crate::host::RenderHost;
use crate::scheduler::state::RunState;
use crate::tasks::{RenderTask, TaskContext, TaskKind};

/// Lifecycle of a [`TaskScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerStatus {
    /// Built, no step taken yet.
    Init,
    /// At least one task has started.
    Running,
    /// Every task ran and was torn down.
    Finished,
    /// Stopped by [`TaskScheduler::cancel`].
    Cancelled,
}

impl SchedulerStatus {
    /// `Finished` or `Cancelled`: further steps do nothing.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

/// What a single [`TaskScheduler::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// One unit of render work was performed.
    Rendered,
    /// A previous step is still marked in flight; nothing was done.
    Busy,
    /// The run is complete; the last task has been torn down.
    Finished,
    /// The run was cancelled.
    Cancelled,
}

/// Runs an ordered queue of render tasks one unit of work per host tick.
///
/// The scheduler never blocks or spawns: the host calls [`step`](Self::step) from its timer and
/// regains control after every unit. Tasks run strictly in insertion order and a task's
/// `clear_rendering` always runs before the next task's `set_rendering`.
pub struct TaskScheduler {
    queue: VecDeque<Box<dyn RenderTask>>,
    current: Option<Box<dyn RenderTask>>,
    state: RunState,
    status: SchedulerStatus,
    ctx: TaskContext,
    units: u64,
}

impl TaskScheduler {
    /// Scheduler over freshly built tasks, run in the given order.
    pub fn new(tasks: impl IntoIterator<Item = TaskKind>, ctx: TaskContext) -> Self {
        Self::from_tasks(tasks.into_iter().map(TaskKind::build).collect(), ctx)
    }

    /// Scheduler over already built tasks.
    pub fn from_tasks(tasks: Vec<Box<dyn RenderTask>>, ctx: TaskContext) -> Self {
        Self {
            queue: tasks.into(),
            current: None,
            state: RunState::default(),
            status: SchedulerStatus::Init,
            ctx,
            units: 0,
        }
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SchedulerStatus {
        self.status
    }

    /// Run state shared with the current task.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Tasks not yet started.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Units of render work performed so far.
    pub fn units_rendered(&self) -> u64 {
        self.units
    }

    /// Advance the pipeline by at most one unit of work.
    ///
    /// `rendering` is set here and cleared by the task at the end of its `render_next_frame`, not
    /// after it returns. A tick that arrives while a slow render is still returning may therefore
    /// see the flag already cleared; hosts deliver ticks serially so this window is not reached
    /// in practice.
    #[tracing::instrument(level = "trace", skip_all, fields(units = self.units))]
    pub fn step(&mut self, host: &mut dyn RenderHost) -> RenderqResult<StepOutcome> {
        match self.status {
            SchedulerStatus::Finished => return Ok(StepOutcome::Finished),
            SchedulerStatus::Cancelled => return Ok(StepOutcome::Cancelled),
            SchedulerStatus::Init | SchedulerStatus::Running => {}
        }

        if self.queue.is_empty() && self.state.task_finished {
            if let Some(last) = self.current.as_mut() {
                last.clear_rendering(host)?;
            }
            self.current = None;
            self.status = SchedulerStatus::Finished;
            tracing::info!(units = self.units, "all render tasks finished");
            return Ok(StepOutcome::Finished);
        }

        if self.state.rendering {
            return Ok(StepOutcome::Busy);
        }

        self.status = SchedulerStatus::Running;

        if self.state.task_finished {
            // A failed teardown keeps the task current so the next tick retries it.
            if let Some(prev) = self.current.as_mut() {
                prev.clear_rendering(host)?;
                tracing::info!(task = prev.kind().label(), "task finished");
            }
            self.current = None;
            let mut next = self
                .queue
                .pop_front()
                .ok_or_else(|| RenderqError::validation("task queue is empty"))?;
            next.set_rendering(host, &mut self.state, &self.ctx)?;
            self.state.frame_cursor = host.scene().frame_start;
            tracing::info!(
                task = next.kind().label(),
                remaining = self.queue.len(),
                "task started"
            );
            self.current = Some(next);
        }

        self.state.rendering = true;
        let task = self
            .current
            .as_mut()
            .ok_or_else(|| RenderqError::validation("no current task"))?;
        task.render_next_frame(host, &mut self.state, &self.ctx)?;
        self.units += 1;
        Ok(StepOutcome::Rendered)
    }

    /// Stop the run. Pending tasks are dropped and nothing already written is rolled back.
    pub fn cancel(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.queue.clear();
        self.state.rendering = false;
        self.status = SchedulerStatus::Cancelled;
        tracing::info!(units = self.units, "render tasks cancelled");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/task_scheduler.rs"]
mod tests;
